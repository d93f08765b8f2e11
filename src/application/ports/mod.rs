//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod side_effect;
mod synthesizer;

pub use side_effect::{SideEffectPort, TaskError};
pub use synthesizer::{SynthesisError, SynthesizerPort};
