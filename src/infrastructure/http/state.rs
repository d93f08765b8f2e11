//! Application State - serve 模式共享状态

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::Pipeline;
use crate::config::LangRegistry;

/// serve 模式共享状态
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub registry: LangRegistry,
    pub audio_dir: PathBuf,
    pub default_language: String,
}

impl AppState {
    pub fn new(
        pipeline: Arc<Pipeline>,
        registry: LangRegistry,
        audio_dir: PathBuf,
        default_language: String,
    ) -> Self {
        Self {
            pipeline,
            registry,
            audio_dir,
            default_language,
        }
    }
}
