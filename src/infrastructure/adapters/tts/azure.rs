//! Azure TTS Client - 调用微软认知服务语音合成
//!
//! 实现 SynthesizerPort trait，通过 HTTP POST SSML 获取音频
//!
//! 外部 TTS API:
//! POST {endpoint}  (Content-Type: application/ssml+xml)
//! Headers: X-Microsoft-OutputFormat / Ocp-Apim-Subscription-Key
//! Response: audio binary

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::application::ports::{SynthesisError, SynthesizerPort};
use crate::domain::SpeechRequest;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_4) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/59.0.3071.115 Safari/537.36";

/// Azure TTS 客户端配置
#[derive(Debug, Clone)]
pub struct AzureSynthesizerConfig {
    /// 合成服务 endpoint
    pub endpoint: String,
    /// 订阅密钥
    pub api_key: String,
    /// 输出音频格式标识
    pub output_format: String,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for AzureSynthesizerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://eastasia.tts.speech.microsoft.com/cognitiveservices/v1".to_string(),
            api_key: String::new(),
            output_format: "audio-24khz-48kbitrate-mono-mp3".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Azure TTS 客户端
pub struct AzureSynthesizer {
    client: Client,
    config: AzureSynthesizerConfig,
}

impl AzureSynthesizer {
    /// 创建新的客户端
    pub fn new(config: AzureSynthesizerConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 构造 SSML 请求体
    fn build_ssml(request: &SpeechRequest) -> String {
        format!(
            r#"<speak version="1.0" xml:lang="{lang}"><voice xml:lang="{lang}" xml:gender="{gender}" name="{voice}"><prosody rate="{rate}">{content}</prosody></voice></speak>"#,
            lang = request.language(),
            gender = request.gender(),
            voice = request.voice(),
            rate = request.speed(),
            content = escape_xml(request.content()),
        )
    }
}

/// 文本进 SSML 前的最小转义
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[async_trait]
impl SynthesizerPort for AzureSynthesizer {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, SynthesisError> {
        let ssml = Self::build_ssml(request);

        // 订阅密钥不进日志
        tracing::debug!(
            endpoint = %self.config.endpoint,
            language = %request.language(),
            voice = %request.voice(),
            content_len = request.content().len(),
            api_key_set = !self.config.api_key.is_empty(),
            "Sending synthesis request"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", &self.config.output_format)
            .header("Ocp-Apim-Subscription-Key", &self.config.api_key)
            .header("User-Agent", USER_AGENT)
            .body(ssml)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::Timeout
                } else if e.is_connect() {
                    SynthesisError::Network(format!("Cannot connect to TTS service: {}", e))
                } else {
                    SynthesisError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::InvalidResponse(format!("Failed to read audio: {}", e)))?
            .to_vec();

        if audio.is_empty() {
            return Err(SynthesisError::InvalidResponse(
                "Empty audio response".to_string(),
            ));
        }

        tracing::debug!(audio_size = audio.len(), "Synthesis response received");
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LangRegistry;
    use std::path::Path;

    #[test]
    fn test_config_default() {
        let config = AzureSynthesizerConfig::default();
        assert!(config.endpoint.contains("cognitiveservices"));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_build_ssml_embeds_request_fields() {
        let registry = LangRegistry::default();
        let profile = registry.get("fr").unwrap();
        let request =
            SpeechRequest::build("bonjour", profile, Some(0.8), Path::new("/tmp")).unwrap();

        let ssml = AzureSynthesizer::build_ssml(&request);
        assert!(ssml.contains(r#"xml:lang="fr-FR""#));
        assert!(ssml.contains(r#"name="fr-FR-DeniseNeural""#));
        assert!(ssml.contains(r#"xml:gender="Male""#));
        assert!(ssml.contains(r#"rate="0.8""#));
        assert!(ssml.contains(">bonjour<"));
    }

    #[test]
    fn test_build_ssml_escapes_markup() {
        let registry = LangRegistry::default();
        let profile = registry.get("en").unwrap();
        let request =
            SpeechRequest::build("a < b & c > d", profile, None, Path::new("/tmp")).unwrap();

        let ssml = AzureSynthesizer::build_ssml(&request);
        assert!(ssml.contains("a &lt; b &amp; c &gt; d"));
    }
}
