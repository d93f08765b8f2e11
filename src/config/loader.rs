//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `LECTOR_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `LECTOR_STORAGE__AUDIO_DIR=/var/cache/tts`
/// - `LECTOR_TTS__API_KEY=...`（密钥只从环境注入，不进配置文件）
/// - `LECTOR_RECORDS__TOKEN=...`
/// - `LECTOR_TASKS__TIMEOUT_SECS=120`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("storage.audio_dir", "data/tts")?
        .set_default("storage.min_artifact_bytes", 1000)?
        .set_default(
            "tts.endpoint",
            "https://eastasia.tts.speech.microsoft.com/cognitiveservices/v1",
        )?
        .set_default("tts.api_key", "")?
        .set_default("tts.output_format", "audio-24khz-48kbitrate-mono-mp3")?
        .set_default("tts.timeout_secs", 30)?
        .set_default("tts.retry.max_attempts", 10)?
        .set_default("tts.retry.initial_delay_ms", 1000)?
        .set_default("playback.player", "ffplay")?
        .set_default("upload.tool", "rclone")?
        .set_default("upload.remote", "r2:tts/")?
        .set_default("upload.clipboard", "pbcopy")?
        .set_default("records.token", "")?
        .set_default("records.timeout_secs", 15)?
        .set_default("tasks.retry.max_attempts", 10)?
        .set_default("tasks.retry.initial_delay_ms", 1000)?
        .set_default("tasks.timeout_secs", 600)?
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8787)?
        .set_default("log.level", "info")?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        // 搜索默认配置文件
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: LECTOR_
    // 层级分隔符: __ (双下划线)
    // 例如: LECTOR_TTS__API_KEY=...
    builder = builder.add_source(
        Environment::with_prefix("LECTOR")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.tts.endpoint.is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS endpoint cannot be empty".to_string(),
        ));
    }

    if config.storage.min_artifact_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "storage.min_artifact_bytes cannot be 0".to_string(),
        ));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.langs.is_empty() {
        return Err(ConfigError::ValidationError(
            "Language registry cannot be empty".to_string(),
        ));
    }

    for profile in &config.langs {
        if profile.name.is_empty() || profile.full_name.is_empty() || profile.voice.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "Incomplete language profile: {:?}",
                profile.name
            )));
        }
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志，密钥只打印是否存在）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Audio Directory: {}", config.storage.audio_dir.display());
    tracing::info!("Min Artifact Bytes: {}", config.storage.min_artifact_bytes);
    tracing::info!("TTS Endpoint: {}", config.tts.endpoint);
    tracing::info!("TTS API Key Set: {}", !config.tts.api_key.is_empty());
    tracing::info!(
        "TTS Retry: {} attempts, {}ms initial delay",
        config.tts.retry.max_attempts,
        config.tts.retry.initial_delay_ms
    );
    tracing::info!("Player: {}", config.playback.player);
    tracing::info!("Upload Remote: {}", config.upload.remote);
    tracing::info!("Records Endpoint: {}", config.records.endpoint);
    tracing::info!("Records Token Set: {}", !config.records.token.is_empty());
    tracing::info!(
        "Task Retry: {} attempts, {}ms initial delay",
        config.tasks.retry.max_attempts,
        config.tasks.retry.initial_delay_ms
    );
    tracing::info!("Task Timeout: {}s", config.tasks.timeout_secs);
    tracing::info!(
        "Languages: {}",
        config
            .langs
            .iter()
            .map(|l| l.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_empty_endpoint() {
        let mut config = AppConfig::default();
        config.tts.endpoint = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_min_artifact_bytes() {
        let mut config = AppConfig::default();
        config.storage.min_artifact_bytes = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_langs() {
        let mut config = AppConfig::default();
        config.langs.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[storage]
audio_dir = "/var/cache/tts"

[tasks]
timeout_secs = 60

[[langs]]
name = "de"
full_name = "de-DE"
voice = "de-DE-KatjaNeural"
gender = "Female"
"#,
        )
        .unwrap();

        let config = load_config_from_path(Some(&path)).unwrap();
        assert_eq!(
            config.storage.audio_dir,
            std::path::PathBuf::from("/var/cache/tts")
        );
        assert_eq!(config.tasks.timeout_secs, 60);
        assert_eq!(config.langs.len(), 1);
        assert_eq!(config.langs[0].name, "de");
        // 文件未覆盖的部分保持默认
        assert_eq!(config.storage.min_artifact_bytes, 1000);
        assert_eq!(config.tts.retry.max_attempts, 10);
    }
}
