//! Task Executor - 并发副作用任务的扇出/汇合
//!
//! 所有任务同时启动、各自带重试、互不取消；
//! 汇合点等到每个任务恰好完成一次后才返回。
//! 失败全部收集进聚合错误，不做 first-error-wins。

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use thiserror::Error;

use crate::application::ports::{SideEffectPort, TaskError};
use crate::application::retry::{retry_with_backoff, RetryPolicy};
use crate::domain::SpeechRequest;

/// 命名任务描述符
///
/// 显式命名，日志与聚合错误都用它；不依赖任何运行时反射。
pub struct NamedTask {
    pub name: &'static str,
    pub port: Arc<dyn SideEffectPort>,
    pub retry: RetryPolicy,
}

impl NamedTask {
    pub fn new(name: &'static str, port: Arc<dyn SideEffectPort>, retry: RetryPolicy) -> Self {
        Self { name, port, retry }
    }
}

/// 单任务执行报告，永远保留（成功与否都会记录日志并计入汇总）
#[derive(Debug)]
pub struct TaskReport {
    pub name: &'static str,
    pub result: Result<(), TaskError>,
    pub elapsed: Duration,
}

impl TaskReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// 单个失败任务的摘要
#[derive(Debug, Clone)]
pub struct TaskFailure {
    pub name: &'static str,
    pub message: String,
}

/// 扇出聚合错误：列出每一个失败任务
#[derive(Debug, Error)]
#[error("{}/{total} side-effect tasks failed: {}", .failures.len(), summary(.failures))]
pub struct FanOutError {
    pub total: usize,
    pub failures: Vec<TaskFailure>,
}

fn summary(failures: &[TaskFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.name, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// 并发执行全部任务并汇合
///
/// - 每个任务先套上自己的重试策略，再整体套可选超时；
/// - 任务间无顺序约束，请求以只读共享方式传入；
/// - 单个任务失败（乃至 panic）不会取消兄弟任务；
/// - 全部成功返回 Ok，否则返回列出所有失败的聚合错误。
///   报告无论成败都完整返回。
pub async fn run_all(
    tasks: Vec<NamedTask>,
    request: Arc<SpeechRequest>,
    task_timeout: Option<Duration>,
) -> (Vec<TaskReport>, Result<(), FanOutError>) {
    let total = tasks.len();
    let mut names = Vec::with_capacity(total);
    let handles: Vec<_> = tasks
        .into_iter()
        .enumerate()
        .map(|(slot, task)| {
            names.push(task.name);
            let request = request.clone();
            tokio::spawn(run_one(task, request, slot, task_timeout))
        })
        .collect();

    let mut reports = Vec::with_capacity(total);
    for (slot, joined) in join_all(handles).await.into_iter().enumerate() {
        match joined {
            Ok(report) => reports.push(report),
            // spawn 的任务 panic 也折叠进汇总，不向外传播
            Err(join_err) => {
                tracing::error!(task = names[slot], slot, error = %join_err, "Task aborted abnormally");
                reports.push(TaskReport {
                    name: names[slot],
                    result: Err(TaskError::Panicked(join_err.to_string())),
                    elapsed: Duration::ZERO,
                });
            }
        }
    }

    let failures: Vec<TaskFailure> = reports
        .iter()
        .filter_map(|r| {
            r.result.as_ref().err().map(|err| TaskFailure {
                name: r.name,
                message: err.to_string(),
            })
        })
        .collect();

    if failures.is_empty() {
        (reports, Ok(()))
    } else {
        (reports, Err(FanOutError { total, failures }))
    }
}

/// 执行单个任务：重试包装 + 可选超时 + 首尾日志
async fn run_one(
    task: NamedTask,
    request: Arc<SpeechRequest>,
    slot: usize,
    task_timeout: Option<Duration>,
) -> TaskReport {
    let NamedTask { name, port, retry } = task;
    let started = Instant::now();
    let attempt_no = AtomicU32::new(0);

    tracing::info!(task = name, slot, "task begins");

    let retried = retry_with_backoff(retry, || {
        let n = attempt_no.fetch_add(1, Ordering::Relaxed) + 1;
        let port = port.clone();
        let request = request.clone();
        async move {
            let attempt_started = Instant::now();
            let result = port.execute(&request).await;
            let elapsed_ms = attempt_started.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => {
                    tracing::info!(task = name, slot, attempt = n, elapsed_ms, "task succeeded")
                }
                Err(err) => tracing::warn!(
                    task = name,
                    slot,
                    attempt = n,
                    elapsed_ms,
                    error = %err,
                    "task attempt failed"
                ),
            }
            result
        }
    });

    let result = match task_timeout {
        Some(limit) => match tokio::time::timeout(limit, retried).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(task = name, slot, timeout_secs = limit.as_secs(), "task timed out");
                Err(TaskError::Timeout(limit))
            }
        },
        None => retried.await,
    };

    let elapsed = started.elapsed();
    match &result {
        Ok(()) => tracing::info!(
            task = name,
            slot,
            elapsed_ms = elapsed.as_millis() as u64,
            "task ends"
        ),
        Err(err) => tracing::error!(
            task = name,
            slot,
            elapsed_ms = elapsed.as_millis() as u64,
            error = %err,
            "task ends with error"
        ),
    }

    TaskReport {
        name,
        result,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LangRegistry;
    use async_trait::async_trait;
    use std::path::Path;

    /// 可注入失败的任务测试替身
    struct ProbeTask {
        calls: AtomicU32,
        fail: bool,
        panics: bool,
        delay: Duration,
    }

    impl ProbeTask {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail: false,
                panics: false,
                delay: Duration::ZERO,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail: true,
                panics: false,
                delay: Duration::ZERO,
            })
        }

        fn panicking() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail: false,
                panics: true,
                delay: Duration::ZERO,
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail: false,
                panics: false,
                delay,
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SideEffectPort for ProbeTask {
        async fn execute(&self, _request: &SpeechRequest) -> Result<(), TaskError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.panics {
                panic!("injected panic");
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                Err(TaskError::Tool("injected failure".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn test_request() -> Arc<SpeechRequest> {
        let registry = LangRegistry::default();
        let profile = registry.get("fr").unwrap();
        Arc::new(SpeechRequest::build("bonjour", profile, None, Path::new("/tmp")).unwrap())
    }

    #[tokio::test]
    async fn test_all_tasks_succeed() {
        let a = ProbeTask::ok();
        let b = ProbeTask::ok();
        let tasks = vec![
            NamedTask::new("a", a.clone(), RetryPolicy::once()),
            NamedTask::new("b", b.clone(), RetryPolicy::once()),
        ];

        let (reports, result) = run_all(tasks, test_request(), None).await;
        assert!(result.is_ok());
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.is_ok()));
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_task_does_not_block_siblings() {
        let failing = ProbeTask::failing();
        let b = ProbeTask::ok();
        let c = ProbeTask::ok();
        let tasks = vec![
            NamedTask::new("upload", failing.clone(), RetryPolicy::once()),
            NamedTask::new("records", b.clone(), RetryPolicy::once()),
            NamedTask::new("playback", c.clone(), RetryPolicy::once()),
        ];

        let (reports, result) = run_all(tasks, test_request(), None).await;

        // 兄弟任务完整执行，没有被跳过
        assert_eq!(b.calls(), 1);
        assert_eq!(c.calls(), 1);

        let err = result.unwrap_err();
        assert_eq!(err.total, 3);
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].name, "upload");

        assert_eq!(reports.len(), 3);
        assert_eq!(reports.iter().filter(|r| r.is_ok()).count(), 2);
    }

    #[tokio::test]
    async fn test_aggregate_error_names_every_failure() {
        let tasks = vec![
            NamedTask::new("upload", ProbeTask::failing(), RetryPolicy::once()),
            NamedTask::new("records", ProbeTask::failing(), RetryPolicy::once()),
            NamedTask::new("playback", ProbeTask::ok(), RetryPolicy::once()),
        ];

        let (_, result) = run_all(tasks, test_request(), None).await;
        let err = result.unwrap_err();
        assert_eq!(err.failures.len(), 2);
        let message = err.to_string();
        assert!(message.contains("upload"));
        assert!(message.contains("records"));
        assert!(message.starts_with("2/3"));
    }

    #[tokio::test]
    async fn test_each_task_is_retried_per_its_policy() {
        let failing = ProbeTask::failing();
        let tasks = vec![NamedTask::new(
            "upload",
            failing.clone(),
            RetryPolicy::new(3, 1),
        )];

        let (_, result) = run_all(tasks, test_request(), None).await;
        assert!(result.is_err());
        assert_eq!(failing.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_task_hits_timeout() {
        let slow = ProbeTask::slow(Duration::from_secs(60));
        let quick = ProbeTask::ok();
        let tasks = vec![
            NamedTask::new("upload", slow, RetryPolicy::once()),
            NamedTask::new("playback", quick.clone(), RetryPolicy::once()),
        ];

        let (reports, result) = run_all(tasks, test_request(), Some(Duration::from_secs(5))).await;

        assert_eq!(quick.calls(), 1);
        let err = result.unwrap_err();
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].name, "upload");
        assert_eq!(reports.len(), 2);
        let timed_out = reports.iter().find(|r| r.name == "upload").unwrap();
        assert!(matches!(timed_out.result, Err(TaskError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_panicking_task_is_reported_by_name() {
        let quick = ProbeTask::ok();
        let tasks = vec![
            NamedTask::new("upload", ProbeTask::panicking(), RetryPolicy::once()),
            NamedTask::new("playback", quick.clone(), RetryPolicy::once()),
        ];

        let (reports, result) = run_all(tasks, test_request(), None).await;

        assert_eq!(quick.calls(), 1);
        let err = result.unwrap_err();
        assert_eq!(err.failures.len(), 1);
        // panic 折叠进汇总时保留任务名，不丢槽位归属
        assert_eq!(err.failures[0].name, "upload");
        let aborted = reports.iter().find(|r| r.name == "upload").unwrap();
        assert!(matches!(aborted.result, Err(TaskError::Panicked(_))));
    }

    #[tokio::test]
    async fn test_empty_task_set_is_ok() {
        let (reports, result) = run_all(vec![], test_request(), None).await;
        assert!(result.is_ok());
        assert!(reports.is_empty());
    }
}
