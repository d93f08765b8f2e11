//! Lector - 内容寻址缓存的文本转语音流水线
//!
//! 架构设计: 缩减版 Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - SpeechRequest: 内容寻址请求（MD5 指纹 + 确定性产物路径）
//! - Artifact: 产物有效性判定
//!
//! 应用层 (application/):
//! - Retry: 有界指数退避原语
//! - SynthesisGate: 缓存判定 / 合成 / 原子持久化
//! - Executor: 副作用任务扇出/汇合、聚合错误
//! - Ports: SynthesizerPort, SideEffectPort
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: Azure TTS 客户端、ffplay 播放、rclone 上传、记录追加
//! - HTTP: serve 模式 API

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
