//! 应用层错误定义
//!
//! 所有错误都作为值返回并一路上抛到 main，由 main 决定退出码；
//! 核心路径里没有任何直接终止进程的分支。

use thiserror::Error;

use super::executor::FanOutError;
use super::ports::SynthesisError;
use crate::config::LangError;
use crate::domain::RequestError;

/// 流水线错误
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 请求构造失败
    #[error(transparent)]
    Request(#[from] RequestError),

    /// 语言注册表查找失败
    #[error(transparent)]
    Language(#[from] LangError),

    /// 合成重试耗尽
    #[error("Synthesis failed after {attempts} attempts: {source}")]
    SynthesisExhausted {
        attempts: u32,
        #[source]
        source: SynthesisError,
    },

    /// 产物写入失败
    #[error("Failed to persist artifact to {path}: {message}")]
    Persist { path: String, message: String },

    /// 一个或多个并发任务失败（产物本身已持久化）
    #[error(transparent)]
    SideEffects(#[from] FanOutError),
}
