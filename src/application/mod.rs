//! Application Layer - 应用层
//!
//! 请求流水线与并发任务编排:
//! - Retry: 有界指数退避原语
//! - SynthesisGate: 缓存判定 / 合成 / 持久化
//! - Executor: 副作用任务扇出/汇合与聚合错误
//! - Ports: 合成器与副作用任务的出站端口

mod error;
mod executor;
mod pipeline;
pub mod ports;
mod retry;
mod synthesis;

pub use error::PipelineError;
pub use executor::{run_all, FanOutError, NamedTask, TaskFailure, TaskReport};
pub use pipeline::{
    compose_tasks, Pipeline, PipelineOptions, PipelineReport, SideEffects, TASK_PLAYBACK,
    TASK_RECORDS, TASK_UPLOAD,
};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use synthesis::{SynthesisGate, SynthesisGateConfig, SynthesisOutcome};
