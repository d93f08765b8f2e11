//! Configuration Module
//!
//! 提供应用配置管理功能，支持多层级配置来源：
//! - 环境变量（最高优先级）
//! - 配置文件（TOML 格式）
//! - 默认值（最低优先级）
//!
//! 语言注册表也在此定义：每个语言档案决定音色、性别与内容正则。

mod lang;
mod loader;
mod types;

pub use lang::{default_profiles, LangError, LangProfile, LangRegistry};
pub use loader::{load_config, load_config_from_path, print_config, ConfigError};
pub use types::{
    AppConfig, LogConfig, PlaybackConfig, RecordsConfig, ServerConfig, StorageConfig, TasksConfig,
    TtsConfig, UploadConfig,
};
