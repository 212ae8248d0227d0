//! Fixed-interval polling for eventually consistent reads

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::cancellable;
use crate::error::{RestClientError, RestClientResult};

/// Attempt budget and the fixed pause between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

/// Repeat `fetch` until it returns at least one item.
///
/// Errors and empty results both count as "not there yet". The pause between
/// attempts is always `policy.delay`; there is no sleep after the last attempt.
/// Cancellation is checked before every attempt and interrupts the pause.
pub async fn retry_until_found<T, F, Fut>(
    cancel: &CancellationToken,
    policy: RetryPolicy,
    mut fetch: F,
) -> RestClientResult<Vec<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RestClientResult<Vec<T>>>,
{
    for attempt in 1..=policy.max_attempts {
        if cancel.is_cancelled() {
            return Err(RestClientError::Cancelled);
        }

        match fetch().await {
            Ok(items) if !items.is_empty() => return Ok(items),
            Ok(_) => debug!(attempt, "no results yet"),
            Err(RestClientError::Cancelled) => return Err(RestClientError::Cancelled),
            Err(err) => debug!(attempt, error = %err, "attempt failed"),
        }

        if attempt < policy.max_attempts {
            cancellable(cancel, tokio::time::sleep(policy.delay)).await?;
        }
    }

    Err(RestClientError::RetryExhausted {
        attempts: policy.max_attempts,
        delay: policy.delay,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    use super::*;

    const DELAY: Duration = Duration::from_secs(2);

    #[tokio::test(start_paused = true)]
    async fn test_returns_first_non_empty_result() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let items = retry_until_found(&CancellationToken::new(), RetryPolicy::new(5, DELAY), || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if attempt <= 2 {
                    Ok(vec![])
                } else {
                    Ok(vec![attempt])
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![3]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let elapsed = started.elapsed();
        assert!(elapsed >= DELAY * 2 && elapsed < DELAY * 3, "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_are_retried() {
        let calls = AtomicU32::new(0);

        let items = retry_until_found(&CancellationToken::new(), RetryPolicy::new(3, DELAY), || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if attempt == 1 {
                    Err(RestClientError::UnexpectedStatus {
                        status: 503,
                        reason: "Service Unavailable".into(),
                    })
                } else {
                    Ok(vec!["event"])
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec!["event"]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let err = retry_until_found(&CancellationToken::new(), RetryPolicy::new(4, DELAY), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(Vec::<u32>::new()) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        let elapsed = started.elapsed();
        assert!(elapsed >= DELAY * 3 && elapsed < DELAY * 4, "{elapsed:?}");
        assert!(matches!(
            err,
            RestClientError::RetryExhausted { attempts: 4, delay } if delay == DELAY
        ));
        assert_eq!(err.to_string(), "could not find matching results after 4 x 2s");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_sleep() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            trigger.cancel();
        });

        let calls = AtomicU32::new(0);
        let started = Instant::now();
        let err = retry_until_found(&cancel, RetryPolicy::new(10, Duration::from_secs(60)), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(Vec::<u32>::new()) }
        })
        .await
        .unwrap_err();

        assert!(err.is_cancelled(), "{err:?}");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_cancelled_attempt_is_not_retried() {
        let calls = AtomicU32::new(0);

        let err = retry_until_found(&CancellationToken::new(), RetryPolicy::new(3, DELAY), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<Vec<u32>, _>(RestClientError::Cancelled) }
        })
        .await
        .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
