//! Side Effect Port - 下游副作用任务抽象
//!
//! 播放、上传、元数据记录都实现同一接口：
//! 对同一个只读请求执行一次，成功或失败。

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::SpeechRequest;

/// 任务执行错误
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("External tool failed: {0}")]
    Tool(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    #[error("Artifact not usable: {0}")]
    InvalidArtifact(String),

    #[error("Task timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Task panicked: {0}")]
    Panicked(String),
}

impl From<std::io::Error> for TaskError {
    fn from(err: std::io::Error) -> Self {
        TaskError::Io(err.to_string())
    }
}

/// Side Effect Port
///
/// 约定：实现只读取请求与产物文件，不得改写任何一方。
#[async_trait]
pub trait SideEffectPort: Send + Sync {
    /// 针对请求执行一次副作用
    async fn execute(&self, request: &SpeechRequest) -> Result<(), TaskError>;
}
