//! Domain Layer - 领域层
//!
//! - SpeechRequest: 内容寻址的合成请求（指纹 + 目标路径），纯值对象
//! - Artifact: 产物有效性判定（只读 metadata 探测）

mod artifact;
mod request;

pub use artifact::{artifact_status, ArtifactStatus, DEFAULT_MIN_ARTIFACT_BYTES};
pub use request::{RequestError, SpeechRequest, DEFAULT_SPEED};
