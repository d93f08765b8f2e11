//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

mod playback;
mod records;
mod upload;
pub mod tts;

pub use playback::PlayerPlayback;
pub use records::HttpRecordAppender;
pub use tts::{AzureSynthesizer, AzureSynthesizerConfig, FakeSynthesizer};
pub use upload::RcloneUploader;
