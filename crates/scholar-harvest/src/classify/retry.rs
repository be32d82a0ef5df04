//! Bounded retry around model calls.

use std::future::Future;
use std::time::{Duration, SystemTime};

use reqwest_retry::{RetryDecision, RetryPolicy};

use crate::config::RetryConfig;
use crate::error::{ClassifyError, ModelError};

/// Run `call` until it succeeds, fails permanently, or attempts run out.
///
/// Waits follow the exponential schedule from `config`. A provider's
/// Retry-After is honoured when longer, but never beyond `max_backoff`.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, mut call: F) -> Result<T, ClassifyError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ModelError>>,
{
    let policy = config.backoff();
    let started = SystemTime::now();
    let mut attempt = 0;

    loop {
        attempt += 1;
        let err = match call(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.is_retryable() {
            return Err(ClassifyError::Rejected {
                attempts: attempt,
                source: err,
            });
        }

        let wait = match policy.should_retry(started, attempt - 1) {
            RetryDecision::Retry { execute_after } => {
                execute_after
                    .duration_since(SystemTime::now())
                    .unwrap_or(Duration::ZERO)
            }
            RetryDecision::DoNotRetry => {
                return Err(ClassifyError::Exhausted {
                    attempts: attempt,
                    last: err,
                });
            }
        };
        let wait = err
            .retry_after()
            .map_or(wait, |hint| wait.max(hint.min(config.max_backoff)));

        tracing::debug!(attempt, ?wait, error = %err, "Model call failed, retrying");
        tokio::time::sleep(wait).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test]
    async fn test_always_failing_call_is_attempted_exactly_three_times() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&RetryConfig::immediate(3), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ModelError::server(503, "busy")) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(ClassifyError::Exhausted { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let result = with_retry(&RetryConfig::immediate(3), |attempt| async move {
            if attempt < 2 {
                Err(ModelError::Timeout(Duration::from_secs(1)))
            } else {
                Ok(attempt)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&RetryConfig::immediate(3), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ModelError::UnexpectedAnswer("maybe".into())) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(ClassifyError::Rejected {
                attempts: 1,
                source: ModelError::UnexpectedAnswer(_)
            })
        ));
    }

    #[tokio::test]
    async fn test_rejection_after_transient_failures_counts_every_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&RetryConfig::immediate(5), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(ModelError::Timeout(Duration::from_secs(1)))
                } else {
                    Err(ModelError::UnexpectedAnswer("preprint".into()))
                }
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let err = result.unwrap_err();
        assert_eq!(err.attempts(), 3);
        assert!(matches!(err, ClassifyError::Rejected { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn test_retry_after_is_capped_by_max_backoff() {
        let calls = AtomicU32::new(0);
        let started = std::time::Instant::now();
        let result: Result<(), _> = with_retry(&RetryConfig::immediate(2), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ModelError::rate_limited(60)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
