//! Synthesis Gate - 缓存判定与合成持久化
//!
//! 状态流: CheckCache → Synthesize → Persist → Done。
//! 相同参数重复调用不会重复打网络：有效产物直接命中缓存返回，
//! 这是整条流水线幂等性的来源。

use std::sync::Arc;
use std::time::Instant;

use crate::application::error::PipelineError;
use crate::application::ports::SynthesizerPort;
use crate::application::retry::{retry_with_backoff, RetryPolicy};
use crate::domain::{artifact_status, SpeechRequest};

/// 合成闸门配置
#[derive(Debug, Clone, Copy)]
pub struct SynthesisGateConfig {
    /// 合成调用的重试策略
    pub retry: RetryPolicy,
    /// 为 true 时无视已有产物，强制重新合成
    pub overwrite: bool,
    /// 产物最小有效体积（字节）
    pub min_artifact_bytes: u64,
}

impl Default for SynthesisGateConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            overwrite: false,
            min_artifact_bytes: crate::domain::DEFAULT_MIN_ARTIFACT_BYTES,
        }
    }
}

/// 合成结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisOutcome {
    /// 有效产物已存在，未触发网络调用
    CacheHit { size: u64 },
    /// 经外部服务合成并写入
    Synthesized { size: u64 },
}

impl SynthesisOutcome {
    pub fn size(&self) -> u64 {
        match self {
            SynthesisOutcome::CacheHit { size } => *size,
            SynthesisOutcome::Synthesized { size } => *size,
        }
    }
}

/// 合成闸门
pub struct SynthesisGate {
    synthesizer: Arc<dyn SynthesizerPort>,
    config: SynthesisGateConfig,
}

impl SynthesisGate {
    pub fn new(synthesizer: Arc<dyn SynthesizerPort>, config: SynthesisGateConfig) -> Self {
        Self {
            synthesizer,
            config,
        }
    }

    /// 解析请求对应的产物：命中缓存直接返回，否则合成并持久化
    pub async fn resolve(&self, request: &SpeechRequest) -> Result<SynthesisOutcome, PipelineError> {
        let dest = request.dest_path();

        // CheckCache
        if !self.config.overwrite {
            let status = artifact_status(dest, self.config.min_artifact_bytes).await;
            if let crate::domain::ArtifactStatus::Valid { size } = status {
                tracing::debug!(
                    path = %dest.display(),
                    size,
                    "Artifact already cached, skipping synthesis"
                );
                return Ok(SynthesisOutcome::CacheHit { size });
            }
        }

        // Synthesize（带重试）
        let attempts = self.config.retry.max_attempts.max(1);
        let attempt_no = std::sync::atomic::AtomicU32::new(0);
        let started = Instant::now();
        let audio = retry_with_backoff(self.config.retry, || {
            let n = attempt_no.fetch_add(1, std::sync::atomic::Ordering::Relaxed) + 1;
            let synthesizer = self.synthesizer.clone();
            async move {
                tracing::debug!(attempt = n, "Synthesis attempt begins");
                let result = synthesizer.synthesize(request).await;
                match &result {
                    Ok(bytes) => {
                        tracing::info!(attempt = n, audio_size = bytes.len(), "Synthesis succeeded")
                    }
                    Err(err) => {
                        tracing::warn!(attempt = n, error = %err, "Synthesis attempt failed")
                    }
                }
                result
            }
        })
        .await
        .map_err(|source| PipelineError::SynthesisExhausted { attempts, source })?;

        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Synthesis resolved"
        );

        // Persist
        let size = self.persist(request, &audio).await?;
        Ok(SynthesisOutcome::Synthesized { size })
    }

    /// 原子写入产物：先写 .part 再重命名，避免残缺文件被误认为缓存命中
    async fn persist(&self, request: &SpeechRequest, audio: &[u8]) -> Result<u64, PipelineError> {
        let dest = request.dest_path();
        let persist_err = |e: std::io::Error| PipelineError::Persist {
            path: dest.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(persist_err)?;
        }

        let part = dest.with_extension("mp3.part");
        tokio::fs::write(&part, audio).await.map_err(persist_err)?;
        tokio::fs::rename(&part, dest).await.map_err(persist_err)?;

        tracing::debug!(
            path = %dest.display(),
            size = audio.len(),
            "Artifact persisted"
        );
        Ok(audio.len() as u64)
    }
}
