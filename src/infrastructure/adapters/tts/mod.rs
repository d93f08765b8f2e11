//! TTS Adapters - 合成器实现

mod azure;
mod fake;

pub use azure::{AzureSynthesizer, AzureSynthesizerConfig};
pub use fake::FakeSynthesizer;
