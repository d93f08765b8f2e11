//! Fake Synthesizer - 用于测试与离线演练的合成器
//!
//! 返回固定的音频字节，不实际调用合成服务；
//! 可配置前 N 次调用失败以演练重试路径。

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::application::ports::{SynthesisError, SynthesizerPort};
use crate::domain::SpeechRequest;

/// Fake 合成器
pub struct FakeSynthesizer {
    audio: Vec<u8>,
    fail_first: u32,
    calls: AtomicU32,
}

impl FakeSynthesizer {
    /// 始终成功，返回给定音频
    pub fn new(audio: Vec<u8>) -> Self {
        Self {
            audio,
            fail_first: 0,
            calls: AtomicU32::new(0),
        }
    }

    /// 前 `fail_first` 次调用返回网络错误，之后成功
    pub fn failing_first(audio: Vec<u8>, fail_first: u32) -> Self {
        Self {
            audio,
            fail_first,
            calls: AtomicU32::new(0),
        }
    }

    /// 已发生的调用次数
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SynthesizerPort for FakeSynthesizer {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, SynthesisError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(
            call = n,
            content_len = request.content().len(),
            "FakeSynthesizer: returning fixed audio"
        );
        if n <= self.fail_first {
            return Err(SynthesisError::Network(format!("injected failure {}", n)));
        }
        Ok(self.audio.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LangRegistry;
    use std::path::Path;

    fn request() -> SpeechRequest {
        let registry = LangRegistry::default();
        let profile = registry.get("en").unwrap();
        SpeechRequest::build("hello", profile, None, Path::new("/tmp")).unwrap()
    }

    #[tokio::test]
    async fn test_returns_fixed_audio_and_counts_calls() {
        let fake = FakeSynthesizer::new(vec![9u8; 1200]);
        let audio = fake.synthesize(&request()).await.unwrap();
        assert_eq!(audio.len(), 1200);
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_first_then_succeeds() {
        let fake = FakeSynthesizer::failing_first(vec![9u8; 1200], 2);
        assert!(fake.synthesize(&request()).await.is_err());
        assert!(fake.synthesize(&request()).await.is_err());
        assert!(fake.synthesize(&request()).await.is_ok());
        assert_eq!(fake.calls(), 3);
    }
}
