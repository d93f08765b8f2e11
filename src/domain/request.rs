//! SpeechRequest - 内容寻址的合成请求
//!
//! 指纹由归一化参数的规范序列化计算得出，同样的
//! (language, voice, content, speed) 永远得到同一个指纹，
//! 这是缓存正确性的前提；key 里的性别槽位固定不变，
//! 与既有缓存和已上传对象保持同键。

use std::path::{Path, PathBuf};

use crate::config::LangProfile;

/// 默认语速
pub const DEFAULT_SPEED: f64 = 0.8;

/// 请求构造错误
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Content cannot be empty")]
    EmptyContent,
}

/// 合成请求 - 不可变值对象
///
/// 构造后只读；指纹在构造时计算一次，之后不再变化。
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    /// 要合成的文本内容
    content: String,
    /// 完整语言标签（如 fr-FR），参与指纹计算
    language: String,
    /// 语言短名（如 fr），供元数据记录使用
    lang_code: String,
    /// 朗读音色名称
    voice: String,
    /// 音色性别（来自语言档案，仅供 SSML 使用，不参与指纹计算）
    gender: String,
    /// 语速
    speed: f64,
    /// 规范序列化的 MD5 指纹（小写十六进制）
    fingerprint: String,
    /// 目标产物路径 {audio_dir}/{fingerprint}.mp3
    dest_path: PathBuf,
}

impl SpeechRequest {
    /// 从语言档案构造请求
    ///
    /// `speed` 为 None 或非正数时取默认值 0.8。
    pub fn build(
        content: impl Into<String>,
        profile: &LangProfile,
        speed: Option<f64>,
        audio_dir: &Path,
    ) -> Result<Self, RequestError> {
        let content = content.into();
        if content.is_empty() {
            return Err(RequestError::EmptyContent);
        }

        let speed = match speed {
            Some(s) if s > 0.0 => s,
            _ => DEFAULT_SPEED,
        };

        let key = canonical_key(&profile.full_name, &profile.voice, &content, speed);
        let fingerprint = format!("{:x}", md5::compute(key.as_bytes()));
        let dest_path = audio_dir.join(format!("{}.mp3", fingerprint));

        tracing::debug!(fingerprint = %fingerprint, "Built speech request");

        Ok(Self {
            content,
            language: profile.full_name.clone(),
            lang_code: profile.name.clone(),
            voice: profile.voice.clone(),
            gender: profile.gender.clone(),
            speed,
            fingerprint,
            dest_path,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn lang_code(&self) -> &str {
        &self.lang_code
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    pub fn gender(&self) -> &str {
        &self.gender
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn dest_path(&self) -> &Path {
        &self.dest_path
    }

    /// 内容预览（用于日志，过长则截断）
    pub fn content_preview(&self, max_len: usize) -> String {
        if self.content.chars().count() > max_len {
            let truncated: String = self.content.chars().take(max_len).collect();
            format!("{}...", truncated)
        } else {
            self.content.clone()
        }
    }
}

/// key 中的性别槽位固定取此值，不随语言档案变化；
/// 已缓存产物与已上传对象都以它为键
const FINGERPRINT_GENDER: &str = "Male";

/// 指纹的规范序列化
///
/// 字段顺序、分隔符、固定的性别槽位和末尾换行符都是指纹契约的一部分，
/// 改动任何一处都会使既有缓存产物全部失效。
fn canonical_key(language: &str, voice: &str, content: &str, speed: f64) -> String {
    format!(
        "{}-{}-{}-{}-{:.1}\n",
        language, voice, FINGERPRINT_GENDER, content, speed
    )
}
