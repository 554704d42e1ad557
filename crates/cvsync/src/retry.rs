//! Retry utilities for upstream fetches.
//!
//! Transient failures back off exponentially (`base × 2^attempt`) for a bounded
//! number of attempts. Throttling is handled separately by the caller, since a
//! 429 neither consumes nor refills this budget.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

use crate::cvcrm::Resource;
use crate::sync::{ProgressCallback, SyncProgress, emit};

/// Default base delay for the first backoff.
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_secs(10);

/// Default number of attempts (the first try included).
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Configuration for retry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Delay before the first retry; doubles on each following one.
    pub base_delay: Duration,
    /// Total attempts, the first one included. Zero behaves like one.
    pub max_attempts: usize,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_RETRY_BASE_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            with_jitter: false,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn new(base_delay: Duration, max_attempts: usize) -> Self {
        Self {
            base_delay,
            max_attempts,
            with_jitter: false,
        }
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    /// Number of retries after the first attempt.
    #[must_use]
    pub fn retries(&self) -> usize {
        self.max_attempts.saturating_sub(1)
    }

    /// The schedule left after `failures` transient failures.
    ///
    /// Attempts shrink by `failures` and the first delay picks up where the
    /// doubling stopped.
    #[must_use]
    pub fn remaining_after(&self, failures: usize) -> Self {
        let shift = u32::try_from(failures).unwrap_or(u32::MAX).min(16);
        Self {
            base_delay: self.base_delay.saturating_mul(1u32 << shift),
            max_attempts: self.max_attempts.max(1).saturating_sub(failures),
            with_jitter: self.with_jitter,
        }
    }

    /// Largest delay the schedule can produce.
    fn ceiling(&self) -> Duration {
        let shift = u32::try_from(self.retries()).unwrap_or(u32::MAX).min(16);
        self.base_delay.saturating_mul(1u32 << shift)
    }

    /// Build an exponential backoff strategy from this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.ceiling())
            .with_factor(2.0)
            .with_max_times(self.retries());

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// Run `operation`, retrying errors accepted by `is_retryable`.
///
/// Every backoff is reported through `on_progress` and logged at debug level.
/// Errors rejected by `is_retryable` return immediately.
pub async fn with_retry<T, E, F, Fut, IsRetryable>(
    mut operation: F,
    config: &RetryConfig,
    is_retryable: IsRetryable,
    resource: Resource,
    page: u32,
    on_progress: Option<&ProgressCallback>,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
    IsRetryable: Fn(&E) -> bool + Send + Sync + 'static,
{
    let attempt = AtomicU32::new(0);

    let retry_op = || {
        attempt.fetch_add(1, Ordering::SeqCst);
        operation()
    };

    retry_op
        .retry(config.clone().into_backoff())
        .notify(|err, dur| {
            let current_attempt = attempt.load(Ordering::SeqCst);
            emit(
                on_progress,
                SyncProgress::RetryBackoff {
                    resource,
                    page,
                    attempt: current_attempt,
                    retry_after_ms: dur.as_millis() as u64,
                    error: err.to_string(),
                },
            );
            tracing::debug!(
                resource = %resource,
                page,
                attempt = current_attempt,
                delay = ?dur,
                error = %err,
                "Transient failure, backing off"
            );
        })
        .when(is_retryable)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    struct TestError {
        message: &'static str,
        transient: bool,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl std::error::Error for TestError {}

    #[test]
    fn default_config_matches_upstream_policy() {
        let config = RetryConfig::default();
        assert_eq!(config.base_delay, Duration::from_secs(10));
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retries(), 2);
        assert!(!config.with_jitter);
    }

    #[test]
    fn zero_attempts_means_no_retries() {
        let config = RetryConfig::new(Duration::from_secs(1), 0);
        assert_eq!(config.retries(), 0);
    }

    #[test]
    fn ceiling_covers_the_last_backoff() {
        let config = RetryConfig::new(Duration::from_secs(10), 3);
        assert_eq!(config.ceiling(), Duration::from_secs(40));
    }

    #[test]
    fn remaining_schedule_continues_the_doubling() {
        let config = RetryConfig::default();
        assert_eq!(config.remaining_after(0), config);

        let rest = config.remaining_after(2);
        assert_eq!(rest.max_attempts, 1);
        assert_eq!(rest.retries(), 0);
        assert_eq!(rest.base_delay, Duration::from_secs(40));

        let rest = config.remaining_after(1);
        assert_eq!(rest.max_attempts, 2);
        assert_eq!(rest.base_delay, Duration::from_secs(20));
    }

    #[test]
    fn jitter_is_opt_in() {
        let config = RetryConfig::default().with_jitter(true);
        assert!(config.with_jitter);
        let _backoff = config.into_backoff();
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_with_doubling_delays() {
        let calls = Arc::new(AtomicU32::new(0));
        let delays: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
        let delays_capture = Arc::clone(&delays);
        let callback: ProgressCallback = Box::new(move |event| {
            if let SyncProgress::RetryBackoff { retry_after_ms, .. } = event {
                delays_capture
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(retry_after_ms);
            }
        });

        let calls_capture = Arc::clone(&calls);
        let operation = move || {
            let calls_capture = Arc::clone(&calls_capture);
            async move {
                let n = calls_capture.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(TestError {
                        message: "503",
                        transient: true,
                    })
                } else {
                    Ok(7u32)
                }
            }
        };

        let started = tokio::time::Instant::now();
        let result = with_retry(
            operation,
            &RetryConfig::default(),
            |e: &TestError| e.transient,
            Resource::Unit,
            4,
            Some(&callback),
        )
        .await;

        assert_eq!(result.expect("third attempt succeeds"), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *delays.lock().unwrap_or_else(|e| e.into_inner()),
            vec![10_000, 20_000]
        );
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_capture = Arc::clone(&calls);
        let operation = move || {
            let calls_capture = Arc::clone(&calls_capture);
            async move {
                calls_capture.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError {
                    message: "timeout",
                    transient: true,
                })
            }
        };

        let err = with_retry(
            operation,
            &RetryConfig::default(),
            |e: &TestError| e.transient,
            Resource::Development,
            1,
            None,
        )
        .await
        .expect_err("budget exhausted");

        assert_eq!(err.to_string(), "timeout");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_capture = Arc::clone(&calls);
        let operation = move || {
            let calls_capture = Arc::clone(&calls_capture);
            async move {
                calls_capture.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError {
                    message: "bad json",
                    transient: false,
                })
            }
        };

        let err = with_retry(
            operation,
            &RetryConfig::default(),
            |e: &TestError| e.transient,
            Resource::Sale,
            1,
            None,
        )
        .await
        .expect_err("expected error");

        assert_eq!(err.to_string(), "bad json");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
