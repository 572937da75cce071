//! Bounded retry with a fixed pause between attempts.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never below 1.
    pub max_attempts: u32,
    /// Pause after each failed attempt except the last.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// The last failure after the attempt budget ran out.
#[derive(Debug)]
pub struct RetryError<E> {
    pub attempts: u32,
    pub last: E,
}

impl<E> RetryError<E> {
    pub fn into_last(self) -> E {
        self.last
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (after {} attempt(s))", self.last, self.attempts)
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryError<E> {}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Call `op` until it succeeds or the attempt budget is spent.
    ///
    /// Attempts are sequential; `op` receives the 1-based attempt number.
    /// Earlier failures are logged and dropped, only the last is returned.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let max = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(label, attempt, "succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if attempt < max => {
                    warn!(label, attempt, max, error = %e, "attempt failed, retrying in {:?}", self.delay);
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(label, attempt, error = %e, "attempts exhausted");
                    return Err(RetryError { attempts: attempt, last: e });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_second_attempt() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default();
        let start = tokio::time::Instant::now();

        let out = policy
            .run("flaky", |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { if attempt < 2 { Err("timeout") } else { Ok(attempt) } }
            })
            .await
            .unwrap();

        assert_eq!(out, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(2) && waited < Duration::from_millis(2_100));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_and_returns_last_error() {
        let policy = RetryPolicy::new(3, Duration::from_secs(2));
        let start = tokio::time::Instant::now();

        let err = policy
            .run("down", |attempt| async move { Err::<(), _>(format!("failure #{}", attempt)) })
            .await
            .unwrap_err();

        assert_eq!(err.attempts, 3);
        assert_eq!(err.into_last(), "failure #3");
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(4) && waited < Duration::from_millis(4_100));
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts, 1);
        let err = policy.run("once", |_| async { Err::<(), _>("no") }).await.unwrap_err();
        assert_eq!(err.attempts, 1);
    }
}
