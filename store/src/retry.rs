use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

/// Exponential backoff schedule: `initial_delay`, doubled after every failed
/// attempt, for at most `max_retries` retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
        }
    }
}

/// Runs `operation` until it succeeds or the policy is exhausted, returning
/// the last error in the latter case.
///
/// Only used for opening a backend; player updates are never retried.
pub async fn retry_with_backoff<F, Fut, T, E>(policy: RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt <= policy.max_retries => {
                tracing::warn!(attempt, error = %e, ?delay, "Attempt failed, retrying");
                sleep(delay).await;
                delay *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn quick(max_retries: usize) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let result: Result<&str, String> = retry_with_backoff(quick(3), || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err("locked".to_string())
            } else {
                Ok("open")
            }
        })
        .await;

        assert_eq!(result, Ok("open"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let result: Result<(), String> = retry_with_backoff(quick(2), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("unreachable".to_string())
        })
        .await;

        assert_eq!(result, Err("unreachable".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
