//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use super::lang::{default_profiles, LangProfile};
use crate::application::RetryPolicy;

/// 应用主配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 合成服务配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 本地播放配置
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// 对象存储上传配置
    #[serde(default)]
    pub upload: UploadConfig,

    /// 元数据记录配置
    #[serde(default)]
    pub records: RecordsConfig,

    /// 并发任务配置
    #[serde(default)]
    pub tasks: TasksConfig,

    /// serve 模式服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,

    /// 语言档案，缺省为内置四种语言
    #[serde(default = "default_profiles")]
    pub langs: Vec<LangProfile>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            tts: TtsConfig::default(),
            playback: PlaybackConfig::default(),
            upload: UploadConfig::default(),
            records: RecordsConfig::default(),
            tasks: TasksConfig::default(),
            server: ServerConfig::default(),
            log: LogConfig::default(),
            langs: default_profiles(),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 音频产物目录
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,

    /// 产物最小有效体积（字节）
    #[serde(default = "default_min_artifact_bytes")]
    pub min_artifact_bytes: u64,
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("data/tts")
}

fn default_min_artifact_bytes() -> u64 {
    crate::domain::DEFAULT_MIN_ARTIFACT_BYTES
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            audio_dir: default_audio_dir(),
            min_artifact_bytes: default_min_artifact_bytes(),
        }
    }
}

/// 合成服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// 合成服务 endpoint
    #[serde(default = "default_tts_endpoint")]
    pub endpoint: String,

    /// API key（通常经环境变量 LECTOR_TTS__API_KEY 注入，不写入配置文件）
    #[serde(default)]
    pub api_key: String,

    /// 输出音频格式标识
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// 单次请求超时（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,

    /// 合成调用的重试策略
    #[serde(default = "default_synthesis_retry")]
    pub retry: RetryPolicy,
}

fn default_tts_endpoint() -> String {
    "https://eastasia.tts.speech.microsoft.com/cognitiveservices/v1".to_string()
}

fn default_output_format() -> String {
    "audio-24khz-48kbitrate-mono-mp3".to_string()
}

fn default_tts_timeout() -> u64 {
    30
}

fn default_synthesis_retry() -> RetryPolicy {
    RetryPolicy::new(10, 1000)
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_tts_endpoint(),
            api_key: String::new(),
            output_format: default_output_format(),
            timeout_secs: default_tts_timeout(),
            retry: default_synthesis_retry(),
        }
    }
}

/// 本地播放配置
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackConfig {
    /// 播放器可执行文件
    #[serde(default = "default_player")]
    pub player: String,

    /// 播放器参数（文件路径追加在末尾）
    #[serde(default = "default_player_args")]
    pub args: Vec<String>,
}

fn default_player() -> String {
    "ffplay".to_string()
}

fn default_player_args() -> Vec<String> {
    ["-hide_banner", "-loglevel", "panic", "-nodisp", "-autoexit"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            player: default_player(),
            args: default_player_args(),
        }
    }
}

/// 对象存储上传配置
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// 上传工具可执行文件
    #[serde(default = "default_upload_tool")]
    pub tool: String,

    /// 远端目标（rclone remote 语法）
    #[serde(default = "default_upload_remote")]
    pub remote: String,

    /// 公开访问的 Base URL，用于拼接产物下载链接
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// 剪贴板命令（链接通过 stdin 传入），空字符串禁用
    #[serde(default = "default_clipboard")]
    pub clipboard: String,
}

fn default_upload_tool() -> String {
    "rclone".to_string()
}

fn default_upload_remote() -> String {
    "r2:tts/".to_string()
}

fn default_public_base_url() -> String {
    "https://pub-c6b11003307646e98afc7540d5f09c41.r2.dev".to_string()
}

fn default_clipboard() -> String {
    "pbcopy".to_string()
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            tool: default_upload_tool(),
            remote: default_upload_remote(),
            public_base_url: default_public_base_url(),
            clipboard: default_clipboard(),
        }
    }
}

/// 元数据记录配置
#[derive(Debug, Clone, Deserialize)]
pub struct RecordsConfig {
    /// 记录服务 endpoint
    #[serde(default = "default_records_endpoint")]
    pub endpoint: String,

    /// Bearer token（通常经环境变量 LECTOR_RECORDS__TOKEN 注入）
    #[serde(default)]
    pub token: String,

    /// 单次请求超时（秒）
    #[serde(default = "default_records_timeout")]
    pub timeout_secs: u64,
}

fn default_records_endpoint() -> String {
    "https://tts-server.rex-zhasm6886.workers.dev/api/item".to_string()
}

fn default_records_timeout() -> u64 {
    15
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_records_endpoint(),
            token: String::new(),
            timeout_secs: default_records_timeout(),
        }
    }
}

/// 并发任务配置
#[derive(Debug, Clone, Deserialize)]
pub struct TasksConfig {
    /// 每个任务自身的重试策略
    #[serde(default = "default_task_retry")]
    pub retry: RetryPolicy,

    /// 单任务超时（秒），0 表示不限时；
    /// 超时罩住整个重试循环，需大于重试策略的退避总和
    /// （默认 10 次、1 秒起步翻倍共计 511 秒），否则持续失败的
    /// 任务总是以超时收场而非暴露真实错误
    #[serde(default = "default_task_timeout")]
    pub timeout_secs: u64,
}

fn default_task_retry() -> RetryPolicy {
    RetryPolicy::new(10, 1000)
}

fn default_task_timeout() -> u64 {
    600
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            retry: default_task_retry(),
            timeout_secs: default_task_timeout(),
        }
    }
}

impl TasksConfig {
    /// 单任务超时，0 映射为 None（不限时）
    pub fn timeout(&self) -> Option<std::time::Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(std::time::Duration::from_secs(self.timeout_secs))
        }
    }
}

/// serve 模式服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8787
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
