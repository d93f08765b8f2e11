//! Synthesizer Port - 语音合成服务抽象
//!
//! 合成传输层（SSML 构造、HTTP 细节）留给 infrastructure/adapters 层，
//! 这里只暴露一次性的 "请求 → 音频字节" 能力。

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::SpeechRequest;

/// 合成错误
///
/// 所有变体都视为可重试，重试耗尽后才上抛调用方。
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Synthesizer Port
///
/// 外部语音合成服务的抽象接口，每次缓存未命中调用一次
#[async_trait]
pub trait SynthesizerPort: Send + Sync {
    /// 合成音频，返回完整音频字节流
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, SynthesisError>;
}
