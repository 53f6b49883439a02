use std::{future::Future, time::Duration};

use tokio::time::sleep;
use tracing::warn;

use crate::error::Error;

/// Retry-forever policy for page fetches: waits `min(step * attempt, cap)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub step: Duration,
    pub cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            step: Duration::from_secs(1),
            cap: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(step: Duration, cap: Duration) -> Self {
        RetryPolicy { step, cap }
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        self.step.saturating_mul(attempt).min(self.cap)
    }

    /// Runs `operation` until it succeeds. Errors that are not retryable
    /// are returned immediately.
    pub async fn run<T, F, Fut>(
        &self,
        context: &str,
        mut operation: F,
    ) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let mut attempt: u32 = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    attempt = attempt.saturating_add(1);
                    let delay = self.delay(attempt);
                    warn!(
                        "{}: attempt {} failed, retrying in {:?}: {}",
                        context, attempt, delay, e
                    );
                    sleep(delay).await;
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicU32, Ordering},
        time::Duration,
    };

    use super::RetryPolicy;
    use crate::error::Error;

    #[test]
    fn capped_delay() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay(1), Duration::from_secs(1));
        assert_eq!(policy.delay(3), Duration::from_secs(3));
        assert_eq!(policy.delay(40), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn retries_until_success() {
        let policy =
            RetryPolicy::new(Duration::from_millis(1), Duration::from_millis(2));
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result = policy
            .run("test", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 4 {
                    Err(Error::UpstreamError(String::from("rate limited")))
                } else {
                    Ok(7)
                }
            })
            .await
            .unwrap();

        assert_eq!(result, 7);
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn logic_errors_are_not_retried() {
        let policy = RetryPolicy::default();
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<(), Error> = policy
            .run("test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::ContinuationNotSupported(String::from("xrp")))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
