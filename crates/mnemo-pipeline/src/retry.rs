//! Bounded retry with exponential backoff and jitter.
//!
//! Wraps any fallible remote operation. Terminal errors return immediately;
//! retryable errors (see [`Error::is_retryable`]) wait `base * 2^k` plus a
//! uniform jitter in `[0, delay/2)` before attempt `k+1`, so concurrent
//! chunk workers hitting the same rate limit do not retry in lockstep. Every
//! wait and every attempt observes the cancellation token.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use mnemo_core::defaults::{RETRY_BASE_DELAY_SECS, RETRY_MAX_ATTEMPTS};
use mnemo_core::{Error, Result};

/// Retry budget and pacing for a remote operation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each further attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_MAX_ATTEMPTS,
            base_delay: Duration::from_secs(RETRY_BASE_DELAY_SECS),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay after failed attempt `attempt` (0-indexed), jittered.
    fn delay_after(&self, attempt: u32) -> Duration {
        let delay = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        let half_ms = (delay.as_millis() / 2) as u64;
        let jitter_ms = if half_ms > 0 {
            rand::thread_rng().gen_range(0..half_ms)
        } else {
            0
        };
        delay + Duration::from_millis(jitter_ms)
    }
}

/// Run `f` under `policy`, retrying retryable failures.
///
/// An already-cancelled token returns [`Error::Cancelled`] without invoking
/// `f`. Exhausting the attempt budget yields [`Error::RetriesExhausted`]
/// wrapping the last observed failure.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    operation: &str,
    mut f: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_err: Option<Error> = None;

    for attempt in 0..policy.max_attempts {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            res = f() => res,
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => {
                debug!(operation, attempt, error = %e, "Terminal failure, not retrying");
                return Err(e);
            }
            Err(e) => {
                warn!(operation, attempt, error = %e, "Retryable failure");
                last_err = Some(e);

                if attempt + 1 < policy.max_attempts {
                    let delay = policy.delay_after(attempt);
                    debug!(operation, delay_ms = delay.as_millis() as u64, "Backing off");
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(Error::Cancelled),
                        _ = sleep(delay) => {}
                    }
                }
            }
        }
    }

    Err(match last_err {
        Some(source) => Error::RetriesExhausted {
            attempts: policy.max_attempts,
            source: Box::new(source),
        },
        None => Error::Internal("retry loop finished without an attempt".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
        }
    }

    fn retryable() -> Error {
        Error::Upstream {
            status: 503,
            message: "unavailable".to_string(),
        }
    }

    #[tokio::test]
    async fn test_success_returns_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();
        let calls_ref = calls.clone();

        let value = with_retry(&fast_policy(), &cancel, "op", move || {
            let calls = calls_ref.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_terminal_error_invokes_exactly_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();
        let calls_ref = calls.clone();

        let err = with_retry::<i32, _, _>(&fast_policy(), &cancel, "op", move || {
            let calls = calls_ref.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::Parse("bad json".to_string()))
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Parse(_)), "error must pass through unchanged");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_twice_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();
        let calls_ref = calls.clone();

        let value = with_retry(&fast_policy(), &cancel, "op", move || {
            let calls = calls_ref.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(retryable())
                } else {
                    Ok("ok")
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_wraps_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();
        let calls_ref = calls.clone();

        let err = with_retry::<i32, _, _>(&fast_policy(), &cancel, "op", move || {
            let calls = calls_ref.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(retryable())
            }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match err {
            Error::RetriesExhausted { attempts, source } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*source, Error::Upstream { status: 503, .. }));
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_already_cancelled_never_invokes() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let calls_ref = calls.clone();

        let err = with_retry::<i32, _, _>(&fast_policy(), &cancel, "op", move || {
            let calls = calls_ref.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff_aborts() {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();

        // Cancel shortly after the first failure puts the retry to sleep.
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1)).await;
            cancel_clone.cancel();
        });

        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(60),
        };
        let err = with_retry::<i32, _, _>(&policy, &cancel, "op", || async {
            Err(retryable())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn test_delay_grows_exponentially() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_secs(2),
        };
        // Jitter adds at most half the base delay on top.
        let d0 = policy.delay_after(0);
        let d1 = policy.delay_after(1);
        let d2 = policy.delay_after(2);
        assert!(d0 >= Duration::from_secs(2) && d0 < Duration::from_secs(3));
        assert!(d1 >= Duration::from_secs(4) && d1 < Duration::from_secs(6));
        assert!(d2 >= Duration::from_secs(8) && d2 < Duration::from_secs(12));
    }
}
