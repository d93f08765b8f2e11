//! Playback - 本地音频播放
//!
//! 实现 SideEffectPort trait，校验产物后在后台启动播放器进程。
//! 只负责把播放拉起来，不等播放结束。

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{SideEffectPort, TaskError};
use crate::config::PlaybackConfig;
use crate::domain::{artifact_status, SpeechRequest};

/// 外部播放器适配器（默认 ffplay）
pub struct PlayerPlayback {
    config: PlaybackConfig,
    min_artifact_bytes: u64,
}

impl PlayerPlayback {
    pub fn new(config: PlaybackConfig, min_artifact_bytes: u64) -> Self {
        Self {
            config,
            min_artifact_bytes,
        }
    }
}

#[async_trait]
impl SideEffectPort for PlayerPlayback {
    async fn execute(&self, request: &SpeechRequest) -> Result<(), TaskError> {
        let file = request.dest_path();

        let status = artifact_status(file, self.min_artifact_bytes).await;
        if !status.is_valid() {
            return Err(TaskError::InvalidArtifact(format!(
                "{}: {:?}",
                file.display(),
                status
            )));
        }

        tracing::debug!(
            player = %self.config.player,
            file = %file.display(),
            "Starting audio playback"
        );

        let mut child = Command::new(&self.config.player)
            .args(&self.config.args)
            .arg(file)
            .spawn()
            .map_err(|e| {
                TaskError::Tool(format!(
                    "Failed to start {} (is it installed and on PATH?): {}",
                    self.config.player, e
                ))
            })?;

        // 播放在后台继续；回收子进程避免僵尸，但不阻塞当前任务
        tokio::spawn(async move {
            let _ = child.wait().await;
        });

        tracing::debug!("Audio playback started in background");
        Ok(())
    }
}
