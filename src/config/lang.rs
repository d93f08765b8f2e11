//! Language Registry - 语言档案注册表
//!
//! 每个语言档案决定合成音色、性别与内容校验正则。
//! 默认内置 fr / pl / jp / en 四种档案，可被配置文件 [[langs]] 覆盖。

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// 语言注册表错误
#[derive(Debug, Error)]
pub enum LangError {
    #[error("Unsupported language: {0}")]
    Unsupported(String),

    #[error("Invalid content pattern for language {lang}: {source}")]
    InvalidPattern {
        lang: String,
        #[source]
        source: regex::Error,
    },
}

/// 语言档案
#[derive(Debug, Clone, Deserialize)]
pub struct LangProfile {
    /// 短名（CLI 选项值，如 fr）
    pub name: String,
    /// 完整 BCP-47 标签（如 fr-FR），参与指纹计算
    pub full_name: String,
    /// 合成音色名称
    pub voice: String,
    /// 音色性别
    #[serde(default = "default_gender")]
    pub gender: String,
    /// 旗帜 emoji（仅用于日志展示）
    #[serde(default)]
    pub flag: String,
    /// 内容校验正则，内容与之不匹配时告警
    #[serde(default)]
    pub pattern: String,
}

fn default_gender() -> String {
    "Male".to_string()
}

/// 内置语言档案
pub fn default_profiles() -> Vec<LangProfile> {
    vec![
        LangProfile {
            name: "fr".to_string(),
            full_name: "fr-FR".to_string(),
            voice: "fr-FR-DeniseNeural".to_string(),
            gender: "Male".to_string(),
            flag: "🇫🇷".to_string(),
            pattern: "[a-zA-ZÀ-ÿ]+".to_string(),
        },
        LangProfile {
            name: "pl".to_string(),
            full_name: "pl-PL".to_string(),
            voice: "pl-PL-AgnieszkaNeural".to_string(),
            gender: "Female".to_string(),
            flag: "🇵🇱".to_string(),
            pattern: "[a-zA-ZąćęłńóśźżĄĆĘŁŃÓŚŹŻ]+".to_string(),
        },
        LangProfile {
            name: "jp".to_string(),
            full_name: "ja-JP".to_string(),
            voice: "ja-JP-MayuNeural".to_string(),
            gender: "Female".to_string(),
            flag: "🇯🇵".to_string(),
            pattern: "[ぁ-んァ-ン一-龯]+".to_string(),
        },
        LangProfile {
            name: "en".to_string(),
            full_name: "en-US".to_string(),
            voice: "en-GB-HollieNeural".to_string(),
            gender: "Female".to_string(),
            flag: "🇺🇸".to_string(),
            pattern: "[a-zA-Z]+".to_string(),
        },
    ]
}

/// 语言注册表
#[derive(Debug, Clone)]
pub struct LangRegistry {
    profiles: Vec<LangProfile>,
}

impl Default for LangRegistry {
    fn default() -> Self {
        Self {
            profiles: default_profiles(),
        }
    }
}

impl LangRegistry {
    /// 从配置档案列表构建；空列表回退到内置默认
    pub fn new(profiles: Vec<LangProfile>) -> Self {
        if profiles.is_empty() {
            tracing::warn!("Empty language list in config, falling back to built-in profiles");
            return Self::default();
        }
        Self { profiles }
    }

    /// 按短名或完整标签查找档案
    pub fn get(&self, name: &str) -> Option<&LangProfile> {
        self.profiles
            .iter()
            .find(|p| p.name == name || p.full_name == name)
    }

    /// 按短名或完整标签查找，未找到返回错误
    pub fn resolve(&self, name: &str) -> Result<&LangProfile, LangError> {
        self.get(name)
            .ok_or_else(|| LangError::Unsupported(name.to_string()))
    }

    pub fn is_supported(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn profiles(&self) -> &[LangProfile] {
        &self.profiles
    }

    /// 所有短名，按字母序（用于帮助信息）
    pub fn all_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.iter().map(|p| p.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// 校验内容是否匹配语言的内容正则
    ///
    /// 档案未配置正则时视为匹配。
    pub fn content_matches(&self, name: &str, content: &str) -> Result<bool, LangError> {
        let profile = self.resolve(name)?;
        if profile.pattern.is_empty() {
            return Ok(true);
        }
        let regex = Regex::new(&profile.pattern).map_err(|source| LangError::InvalidPattern {
            lang: profile.name.clone(),
            source,
        })?;
        Ok(regex.is_match(content))
    }
}
