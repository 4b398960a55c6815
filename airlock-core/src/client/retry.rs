//! Shared retry policy for calls to external services (via `backon`).
//!
//! Up to 3 attempts total: the first immediately, then after 1s and 2s.
//! Only transient failures are retried; application-level responses
//! surface to the caller untouched so they keep their meaning (a 409
//! from the recorder is a fact, not a glitch).

use std::future::Future;
use std::time::Duration;

use backon::{BackoffBuilder, ExponentialBuilder};
use tracing::warn;

use super::ClientError;

const MAX_ATTEMPTS: usize = 3;
const INITIAL_DELAY: Duration = Duration::from_secs(1);

pub(crate) async fn with_retry<T, F, Fut>(operation: &str, mut call: F) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let backoff = ExponentialBuilder::default()
        .with_min_delay(INITIAL_DELAY)
        .with_factor(2.0)
        .with_max_times(MAX_ATTEMPTS - 1)
        .build();

    let mut last_err = None;
    for delay in std::iter::once(Duration::ZERO).chain(backoff) {
        if delay > Duration::ZERO {
            tokio::time::sleep(delay).await;
        }

        match call().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !e.is_transient() {
                    return Err(e);
                }
                warn!("{} failed: {} - retrying in {:?}", operation, e, delay);
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| ClientError::Network("Retry exhausted".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_retry_until_success() {
        let attempts = AtomicUsize::new(0);

        let result: Result<u32, ClientError> = with_retry("test call", || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(ClientError::Network("connection reset".to_string()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.expect("third attempt succeeds"), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_exhaust_budget() {
        let attempts = AtomicUsize::new(0);

        let result: Result<u32, ClientError> = with_retry("test call", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(ClientError::Network("connection reset".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(ClientError::Network(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_application_errors_are_not_retried() {
        let attempts = AtomicUsize::new(0);

        let result: Result<u32, ClientError> = with_retry("test call", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ClientError::Status {
                    status: StatusCode::CONFLICT,
                    body: "busy".to_string(),
                })
            }
        })
        .await;

        assert_eq!(result.unwrap_err().status(), Some(StatusCode::CONFLICT));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
