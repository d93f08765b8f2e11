//! Pipeline - 请求流水线
//!
//! 控制流: 合成闸门解析产物（缓存或网络）→ 产物落盘 →
//! 副作用任务扇出/汇合 → 聚合结果返回调用方。
//!
//! 缓存只以合成步骤为键：副作用失败不会作废产物，
//! 下次同参数调用会缓存命中，只需重试失败的副作用。

use std::sync::Arc;
use std::time::Duration;

use crate::application::error::PipelineError;
use crate::application::executor::{run_all, NamedTask, TaskReport};
use crate::application::ports::{SideEffectPort, SynthesizerPort};
use crate::application::retry::RetryPolicy;
use crate::application::synthesis::{SynthesisGate, SynthesisGateConfig, SynthesisOutcome};
use crate::domain::SpeechRequest;

/// 任务名称常量（日志与聚合错误共用）
pub const TASK_PLAYBACK: &str = "playback";
pub const TASK_UPLOAD: &str = "upload";
pub const TASK_RECORDS: &str = "records";

/// 流水线副作用端口集合
#[derive(Clone)]
pub struct SideEffects {
    pub playback: Arc<dyn SideEffectPort>,
    pub upload: Arc<dyn SideEffectPort>,
    pub records: Arc<dyn SideEffectPort>,
}

/// 流水线选项
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// 强制重新合成，无视已有产物
    pub overwrite: bool,
    /// dry-run：只播放，不上传、不记录
    pub dry_run: bool,
    /// 合成调用重试策略
    pub synthesis_retry: RetryPolicy,
    /// 副作用任务重试策略
    pub task_retry: RetryPolicy,
    /// 单任务超时
    pub task_timeout: Option<Duration>,
    /// 产物最小有效体积
    pub min_artifact_bytes: u64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            dry_run: false,
            synthesis_retry: RetryPolicy::default(),
            task_retry: RetryPolicy::default(),
            task_timeout: Some(Duration::from_secs(600)),
            min_artifact_bytes: crate::domain::DEFAULT_MIN_ARTIFACT_BYTES,
        }
    }
}

/// 流水线运行报告
#[derive(Debug)]
pub struct PipelineReport {
    pub outcome: SynthesisOutcome,
    pub tasks: Vec<TaskReport>,
}

/// 请求流水线
pub struct Pipeline {
    gate: SynthesisGate,
    side_effects: SideEffects,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        synthesizer: Arc<dyn SynthesizerPort>,
        side_effects: SideEffects,
        options: PipelineOptions,
    ) -> Self {
        let gate = SynthesisGate::new(
            synthesizer,
            SynthesisGateConfig {
                retry: options.synthesis_retry,
                overwrite: options.overwrite,
                min_artifact_bytes: options.min_artifact_bytes,
            },
        );
        Self {
            gate,
            side_effects,
            options,
        }
    }

    /// 运行整条流水线
    ///
    /// 返回 Ok 表示产物就绪且所有副作用成功；
    /// SideEffects 错误表示产物已就绪但部分副作用失败。
    pub async fn run(&self, request: SpeechRequest) -> Result<PipelineReport, PipelineError> {
        let outcome = self.gate.resolve(&request).await?;
        tracing::info!(
            fingerprint = %request.fingerprint(),
            cache_hit = matches!(outcome, SynthesisOutcome::CacheHit { .. }),
            size = outcome.size(),
            "Artifact resolved"
        );

        // 任务集合在扇出前一次性决定
        let tasks = compose_tasks(&self.side_effects, self.options.dry_run, self.options.task_retry);
        let request = Arc::new(request);
        let (reports, result) = run_all(tasks, request, self.options.task_timeout).await;

        match result {
            Ok(()) => Ok(PipelineReport {
                outcome,
                tasks: reports,
            }),
            Err(err) => Err(PipelineError::SideEffects(err)),
        }
    }
}

/// 组装任务集合
///
/// dry-run 只保留本地播放；任务顺序只影响日志槽位，不影响语义。
pub fn compose_tasks(
    side_effects: &SideEffects,
    dry_run: bool,
    retry: RetryPolicy,
) -> Vec<NamedTask> {
    let mut tasks = Vec::with_capacity(3);
    if !dry_run {
        tasks.push(NamedTask::new(TASK_UPLOAD, side_effects.upload.clone(), retry));
        tasks.push(NamedTask::new(TASK_RECORDS, side_effects.records.clone(), retry));
    }
    tasks.push(NamedTask::new(TASK_PLAYBACK, side_effects.playback.clone(), retry));
    tasks
}
