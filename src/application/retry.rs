//! Retry - 有界指数退避重试
//!
//! 网络类操作统一经由此原语包装。退避无抖动、无上限，
//! 低频个人工具够用；若复用到高并发场景需补上限与抖动。

use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryPolicy {
    /// 最大尝试次数（含首次调用）；0 按 1 处理
    pub max_attempts: u32,
    /// 首次失败后的等待时长（毫秒），之后每次失败翻倍
    pub initial_delay_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            initial_delay_ms,
        }
    }

    /// 单次尝试、不等待
    pub fn once() -> Self {
        Self::new(1, 0)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(10, 1000)
    }
}

/// 按策略重试异步操作
///
/// - 首次成功立即返回；
/// - 失败后按 initial_delay 起步、每次翻倍的间隔等待再试，
///   最后一次失败后不再等待；
/// - 耗尽尝试次数返回**最后一次**的错误；
/// - `max_attempts == 0` 按 1 处理，保证至少调用一次，
///   避免零次迭代静默返回；
/// - 本函数不记录日志，每次调用的结果由调用方负责记录。
pub async fn retry_with_backoff<F, Fut, T, E>(policy: RetryPolicy, mut attempt: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay();
    let mut attempt_no = 1u32;

    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt_no >= max_attempts {
                    return Err(err);
                }
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt_no += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_success_returns_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<u32, &str> = retry_with_backoff(RetryPolicy::new(5, 1), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(42)
            }
        })
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_called_exactly_max_attempts_times() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), String> = retry_with_backoff(RetryPolicy::new(4, 1), || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                Err(format!("attempt {} failed", n))
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 返回最后一次的错误，不是第一次的
        assert_eq!(result.unwrap_err(), "attempt 4 failed");
    }

    #[tokio::test]
    async fn test_zero_max_attempts_behaves_as_one() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), &str> = retry_with_backoff(RetryPolicy::new(0, 1000), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("boom")
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<&str, &str> = retry_with_backoff(RetryPolicy::new(5, 1), || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err("not yet")
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delays_double_between_attempts() {
        // initialDelay=100ms, maxAttempts=4 → 100 + 200 + 400 = 700ms，
        // 最后一次失败后不再等待
        let start = tokio::time::Instant::now();

        let result: Result<(), &str> =
            retry_with_backoff(RetryPolicy::new(4, 100), || async { Err("always") }).await;

        assert!(result.is_err());
        assert_eq!(start.elapsed(), Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_sleep_on_single_attempt() {
        let start = tokio::time::Instant::now();

        let result: Result<(), &str> =
            retry_with_backoff(RetryPolicy::once(), || async { Err("always") }).await;

        assert!(result.is_err());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
