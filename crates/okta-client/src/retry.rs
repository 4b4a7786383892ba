//! Bounded retry with backoff for throttled API calls.
//!
//! Only HTTP 429 responses are retried. Whether a call is retried depends on
//! how its response was classified, never on the attempt count alone.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};

/// Hard ceiling on the number of retries a policy may be configured with.
pub const MAX_RETRIES_CEILING: u32 = 100;

/// Retry policy for a single logical API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = no retries).
    pub max_retries: u32,
    /// First backoff delay; doubled on every retry.
    pub min_backoff: Duration,
    /// Upper bound for any single backoff delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            min_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

/// Failure of a single attempt, with the server's hint on when to try again.
#[derive(Debug)]
pub struct AttemptFailure {
    pub error: ApiError,
    pub retry_after: Option<Duration>,
}

impl From<ApiError> for AttemptFailure {
    fn from(error: ApiError) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given retry budget and default backoff bounds.
    ///
    /// Budgets above [`MAX_RETRIES_CEILING`] are clamped.
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries: max_retries.min(MAX_RETRIES_CEILING),
            ..Self::default()
        }
    }

    /// Sets the backoff bounds.
    #[must_use]
    pub fn with_backoff(mut self, min_backoff: Duration, max_backoff: Duration) -> Self {
        self.min_backoff = min_backoff;
        self.max_backoff = max_backoff;
        self
    }

    /// Whether a failed attempt should be followed by another one.
    ///
    /// `attempt` is zero-based: the first attempt is 0.
    #[must_use]
    pub fn should_retry(&self, attempt: u32, error: &ApiError) -> bool {
        error.is_rate_limited() && attempt < self.max_retries
    }

    /// Delay before the retry that follows attempt `attempt`.
    ///
    /// A server-provided hint wins over exponential backoff; both are kept
    /// within `[min_backoff, max_backoff]`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let delay = retry_after.unwrap_or_else(|| {
            let factor = 2u32.saturating_pow(attempt);
            self.min_backoff.saturating_mul(factor)
        });
        delay.max(self.min_backoff).min(self.max_backoff)
    }

    /// Runs `f` until it succeeds, fails with a non-retryable error, the
    /// retry budget is spent, or `cancel` fires.
    ///
    /// A spent budget yields [`ApiError::RateLimited`] carrying the total
    /// number of attempts. Cancellation returns the most recent error, or
    /// [`ApiError::Cancelled`] when no attempt has completed yet.
    pub async fn execute<F, Fut, T>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        mut f: F,
    ) -> ApiResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AttemptFailure>>,
    {
        let mut attempt: u32 = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(ApiError::Cancelled);
            }

            let failure = match f().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(operation, attempts = attempt + 1, "Succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(failure) => failure,
            };

            let error = match failure.error {
                ApiError::RateLimited { .. } => ApiError::RateLimited {
                    attempts: attempt + 1,
                },
                other => other,
            };

            if !self.should_retry(attempt, &error) {
                if error.is_rate_limited() {
                    warn!(operation, attempts = attempt + 1, "Retry budget exhausted");
                }
                return Err(error);
            }

            let delay = self.delay_for(attempt, failure.retry_after);
            debug!(
                operation,
                attempt = attempt + 1,
                max_retries = self.max_retries,
                delay_ms = delay.as_millis() as u64,
                "Rate limited, backing off"
            );

            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(operation, attempts = attempt + 1, "Cancelled during backoff");
                    return Err(error);
                }
                () = tokio::time::sleep(delay) => {}
            }
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries).with_backoff(Duration::ZERO, Duration::ZERO)
    }

    fn throttled() -> AttemptFailure {
        ApiError::RateLimited { attempts: 1 }.into()
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.min_backoff, Duration::from_secs(1));
        assert_eq!(policy.max_backoff, Duration::from_secs(30));
    }

    #[test]
    fn test_new_clamps_to_ceiling() {
        assert_eq!(RetryPolicy::new(500).max_retries, MAX_RETRIES_CEILING);
        assert_eq!(RetryPolicy::new(7).max_retries, 7);
    }

    #[test]
    fn test_only_rate_limits_are_retried() {
        let policy = RetryPolicy::new(3);
        assert!(policy.should_retry(0, &ApiError::RateLimited { attempts: 1 }));
        assert!(!policy.should_retry(3, &ApiError::RateLimited { attempts: 4 }));
        assert!(!policy.should_retry(0, &ApiError::network("connection reset")));
        assert!(!policy.should_retry(0, &ApiError::not_found("rule")));
        assert!(!policy.should_retry(
            0,
            &ApiError::Http {
                status: 503,
                code: None,
                summary: "unavailable".into(),
            }
        ));
    }

    #[test]
    fn test_delay_exponential_backoff() {
        let policy = RetryPolicy::new(5)
            .with_backoff(Duration::from_secs(1), Duration::from_secs(10));

        assert_eq!(policy.delay_for(0, None), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1, None), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2, None), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3, None), Duration::from_secs(8));
        assert_eq!(policy.delay_for(4, None), Duration::from_secs(10));
        assert_eq!(policy.delay_for(40, None), Duration::from_secs(10));
    }

    #[test]
    fn test_delay_uses_server_hint() {
        let policy = RetryPolicy::new(5)
            .with_backoff(Duration::from_secs(1), Duration::from_secs(30));

        assert_eq!(
            policy.delay_for(3, Some(Duration::from_secs(12))),
            Duration::from_secs(12)
        );
        assert_eq!(
            policy.delay_for(0, Some(Duration::from_secs(120))),
            Duration::from_secs(30)
        );
        assert_eq!(policy.delay_for(0, Some(Duration::ZERO)), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_execute_succeeds_after_throttling() {
        let policy = instant_policy(3);
        let counter = Arc::new(AtomicU32::new(0));
        let calls = counter.clone();

        let result = policy
            .execute("get_rule", &CancellationToken::new(), move || {
                let calls = calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(throttled())
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_execute_exhausts_budget() {
        let policy = instant_policy(4);
        let counter = Arc::new(AtomicU32::new(0));
        let calls = counter.clone();

        let result: ApiResult<()> = policy
            .execute("get_rule", &CancellationToken::new(), move || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(throttled())
                }
            })
            .await;

        match result {
            Err(ApiError::RateLimited { attempts }) => assert_eq!(attempts, 5),
            other => panic!("expected RateLimited, got {other:?}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_execute_does_not_retry_other_errors() {
        let policy = instant_policy(4);
        let counter = Arc::new(AtomicU32::new(0));
        let calls = counter.clone();

        let result: ApiResult<()> = policy
            .execute("get_rule", &CancellationToken::new(), move || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(ApiError::network("connection refused").into())
                }
            })
            .await;

        assert!(matches!(result, Err(ApiError::Network(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_execute_zero_retries() {
        let policy = instant_policy(0);
        let result: ApiResult<()> = policy
            .execute("get_rule", &CancellationToken::new(), || async {
                Err(throttled())
            })
            .await;

        assert!(matches!(result, Err(ApiError::RateLimited { attempts: 1 })));
    }

    #[tokio::test]
    async fn test_cancel_during_backoff_returns_last_error() {
        let policy = RetryPolicy::new(10)
            .with_backoff(Duration::from_secs(60), Duration::from_secs(60));
        let cancel = CancellationToken::new();
        let counter = Arc::new(AtomicU32::new(0));
        let calls = counter.clone();
        let trigger = cancel.clone();

        let result: ApiResult<()> = policy
            .execute("get_rule", &cancel, move || {
                let calls = calls.clone();
                let trigger = trigger.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    trigger.cancel();
                    Err(throttled())
                }
            })
            .await;

        assert!(matches!(result, Err(ApiError::RateLimited { attempts: 1 })));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result: ApiResult<()> = instant_policy(3)
            .execute("get_rule", &cancel, || async { Ok(()) })
            .await;

        assert!(matches!(result, Err(ApiError::Cancelled)));
    }
}
