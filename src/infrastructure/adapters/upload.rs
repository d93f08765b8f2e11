//! Upload - 对象存储上传（rclone）
//!
//! 实现 SideEffectPort trait：
//! 1. 校验产物非空
//! 2. rclone copy 到远端
//! 3. 拼出公开下载链接并写入剪贴板

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::application::ports::{SideEffectPort, TaskError};
use crate::config::UploadConfig;
use crate::domain::SpeechRequest;

/// rclone 上传适配器
pub struct RcloneUploader {
    config: UploadConfig,
}

impl RcloneUploader {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    /// 产物的公开下载链接（对象名即指纹）
    pub fn public_url(&self, request: &SpeechRequest) -> String {
        format!(
            "{}/{}.mp3",
            self.config.public_base_url.trim_end_matches('/'),
            request.fingerprint()
        )
    }

    /// 把链接经 stdin 写入剪贴板命令；clipboard 为空时跳过
    async fn copy_to_clipboard(&self, url: &str) -> Result<(), TaskError> {
        if self.config.clipboard.is_empty() {
            return Ok(());
        }

        let mut child = Command::new(&self.config.clipboard)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| {
                TaskError::Tool(format!("Failed to start {}: {}", self.config.clipboard, e))
            })?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(url.as_bytes())
                .await
                .map_err(|e| TaskError::Io(e.to_string()))?;
        }
        drop(child.stdin.take());

        let status = child
            .wait()
            .await
            .map_err(|e| TaskError::Io(e.to_string()))?;
        if !status.success() {
            return Err(TaskError::Tool(format!(
                "{} exited with {}",
                self.config.clipboard, status
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SideEffectPort for RcloneUploader {
    async fn execute(&self, request: &SpeechRequest) -> Result<(), TaskError> {
        let file = request.dest_path();

        let meta = tokio::fs::metadata(file)
            .await
            .map_err(|e| TaskError::InvalidArtifact(format!("{}: {}", file.display(), e)))?;
        if meta.len() == 0 {
            return Err(TaskError::InvalidArtifact(format!(
                "{}: file is empty",
                file.display()
            )));
        }

        tracing::debug!(
            tool = %self.config.tool,
            file = %file.display(),
            remote = %self.config.remote,
            "Uploading artifact"
        );

        let output = Command::new(&self.config.tool)
            .arg("copy")
            .arg(file)
            .arg(&self.config.remote)
            .output()
            .await
            .map_err(|e| {
                TaskError::Tool(format!(
                    "Failed to run {} (is it installed and on PATH?): {}",
                    self.config.tool, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TaskError::Tool(format!(
                "{} copy failed ({}): {}",
                self.config.tool,
                output.status,
                stderr.trim()
            )));
        }

        let url = self.public_url(request);
        tracing::info!(url = %url, "Artifact uploaded");

        if let Err(err) = self.copy_to_clipboard(&url).await {
            // 链接进不了剪贴板不影响上传本身，只告警
            tracing::warn!(error = %err, "Failed to copy url to clipboard");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LangRegistry;

    fn request_in(dir: &std::path::Path) -> SpeechRequest {
        let registry = LangRegistry::default();
        let profile = registry.get("fr").unwrap();
        SpeechRequest::build("bonjour", profile, None, dir).unwrap()
    }

    fn uploader(tool: &str) -> RcloneUploader {
        RcloneUploader::new(UploadConfig {
            tool: tool.to_string(),
            remote: "r2:tts/".to_string(),
            public_base_url: "https://cdn.example.com".to_string(),
            clipboard: String::new(),
        })
    }

    #[test]
    fn test_public_url_uses_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let request = request_in(dir.path());
        let url = uploader("rclone").public_url(&request);
        assert_eq!(
            url,
            format!("https://cdn.example.com/{}.mp3", request.fingerprint())
        );
    }

    #[test]
    fn test_public_url_tolerates_trailing_slash() {
        let dir = tempfile::tempdir().unwrap();
        let request = request_in(dir.path());
        let mut config = UploadConfig::default();
        config.public_base_url = "https://cdn.example.com/".to_string();
        config.clipboard = String::new();
        let uploader = RcloneUploader::new(config);
        assert!(!uploader.public_url(&request).contains(".com//"));
    }

    #[tokio::test]
    async fn test_missing_artifact_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = uploader("rclone")
            .execute(&request_in(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::InvalidArtifact(_)));
    }

    #[tokio::test]
    async fn test_empty_artifact_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let request = request_in(dir.path());
        tokio::fs::write(request.dest_path(), b"").await.unwrap();

        let err = uploader("rclone").execute(&request).await.unwrap_err();
        assert!(matches!(err, TaskError::InvalidArtifact(_)));
    }

    #[tokio::test]
    async fn test_missing_tool_is_a_tool_error() {
        let dir = tempfile::tempdir().unwrap();
        let request = request_in(dir.path());
        tokio::fs::write(request.dest_path(), vec![0u8; 2048])
            .await
            .unwrap();

        let err = uploader("definitely-not-rclone")
            .execute(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Tool(_)));
    }

    #[tokio::test]
    async fn test_successful_tool_run_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let request = request_in(dir.path());
        tokio::fs::write(request.dest_path(), vec![0u8; 2048])
            .await
            .unwrap();

        // /bin/true 忽略参数并以 0 退出，只验证成功路径
        uploader("true").execute(&request).await.unwrap();
    }
}
