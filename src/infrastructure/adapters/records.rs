//! Records - 元数据记录追加
//!
//! 实现 SideEffectPort trait，向记录服务 POST 一条 JSON 记录:
//! {"language": "...", "content": "...", "FileSizeKb": "...", "md5": "..."}
//! 字段名与既有服务端保持线上兼容，不要改动。

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{SideEffectPort, TaskError};
use crate::config::RecordsConfig;
use crate::domain::SpeechRequest;

/// 记录条目（线上兼容的字段名）
#[derive(Debug, Serialize)]
struct RecordEntry<'a> {
    language: &'a str,
    content: &'a str,
    #[serde(rename = "FileSizeKb")]
    file_size_kb: String,
    md5: &'a str,
}

/// HTTP 记录追加适配器
pub struct HttpRecordAppender {
    client: Client,
    config: RecordsConfig,
}

impl HttpRecordAppender {
    pub fn new(config: RecordsConfig) -> Result<Self, TaskError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TaskError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl SideEffectPort for HttpRecordAppender {
    async fn execute(&self, request: &SpeechRequest) -> Result<(), TaskError> {
        let meta = tokio::fs::metadata(request.dest_path())
            .await
            .map_err(|e| {
                TaskError::InvalidArtifact(format!("{}: {}", request.dest_path().display(), e))
            })?;

        let entry = RecordEntry {
            language: request.lang_code(),
            content: request.content(),
            file_size_kb: format!("{}", meta.len() / 1024),
            md5: request.fingerprint(),
        };

        tracing::debug!(
            endpoint = %self.config.endpoint,
            language = %entry.language,
            file_size_kb = %entry.file_size_kb,
            token_set = !self.config.token.is_empty(),
            "Appending record"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.token)
            .json(&entry)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TaskError::Network("request timeout".to_string())
                } else {
                    TaskError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TaskError::Service {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!("Record appended");
        Ok(())
    }
}
