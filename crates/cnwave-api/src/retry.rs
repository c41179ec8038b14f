//! Retry policy for controller calls.
//!
//! One policy wraps one logical request inside the executor. Every error
//! is retryable; the policy only decides how many times and how long to
//! wait. Delays double from `base_delay` and each one gets a uniform
//! jitter in `[0, max_jitter)` on top.
//!
//! Retry events are reported through a [`RetryObserver`] handed in by the
//! owner of the policy.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::error::Error;

/// Exponential backoff with additive jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Values below 1 behave as 1.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound (exclusive) of the random jitter added to every delay.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            ..Self::default()
        }
    }

    /// A policy that makes a single attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    pub fn with_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Backoff (without jitter) after the given failed attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1_u32 << shift)
    }

    fn jitter(&self) -> Duration {
        let bound = u64::try_from(self.max_jitter.as_nanos()).unwrap_or(u64::MAX);
        if bound == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(rand::rng().random_range(0..bound))
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    ///
    /// The error from the final attempt is returned unchanged.
    pub async fn run<T, F, Fut>(
        &self,
        operation: &str,
        observer: &dyn RetryObserver,
        mut op: F,
    ) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) if attempt >= max_attempts => {
                    observer.on_exhausted(operation, attempt, &error);
                    return Err(error);
                }
                Err(error) => {
                    let delay = self.backoff(attempt) + self.jitter();
                    observer.on_retry(&RetryEvent {
                        operation,
                        attempt,
                        max_attempts,
                        delay,
                        error: &error,
                    });
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

// ── Observation ─────────────────────────────────────────────────────

/// A failed attempt that is about to be retried.
#[derive(Debug)]
pub struct RetryEvent<'a> {
    pub operation: &'a str,
    pub attempt: u32,
    pub max_attempts: u32,
    pub delay: Duration,
    pub error: &'a Error,
}

/// Receives retry events from a [`RetryPolicy`].
pub trait RetryObserver: Send + Sync {
    fn on_retry(&self, event: &RetryEvent<'_>);

    fn on_exhausted(&self, _operation: &str, _attempts: u32, _error: &Error) {}
}

/// Emits retry events as `tracing` warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RetryObserver for TracingObserver {
    fn on_retry(&self, event: &RetryEvent<'_>) {
        warn!(
            operation = event.operation,
            attempt = event.attempt,
            max_attempts = event.max_attempts,
            delay_ms = u64::try_from(event.delay.as_millis()).unwrap_or(u64::MAX),
            error = %event.error,
            "controller call failed, retrying"
        );
    }

    fn on_exhausted(&self, operation: &str, attempts: u32, error: &Error) {
        warn!(operation, attempts, error = %error, "giving up on controller call");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        delays: Mutex<Vec<Duration>>,
        exhausted: AtomicU32,
    }

    impl RetryObserver for Recorder {
        fn on_retry(&self, event: &RetryEvent<'_>) {
            self.delays.lock().unwrap().push(event.delay);
        }

        fn on_exhausted(&self, _operation: &str, attempts: u32, _error: &Error) {
            self.exhausted.store(attempts, Ordering::SeqCst);
        }
    }

    fn timeout_error() -> Error {
        Error::ApiTimeout {
            message: "API request timeout".into(),
            details: None,
        }
    }

    #[test]
    fn backoff_doubles_from_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(8));
        assert_eq!(policy.backoff(4), Duration::from_secs(16));
    }

    #[test]
    fn backoff_saturates_instead_of_overflowing() {
        let policy = RetryPolicy::new(100, Duration::from_secs(u64::MAX / 2));
        assert_eq!(policy.backoff(64), Duration::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_the_attempt_that_stops_failing() {
        let policy = RetryPolicy::default().with_jitter(Duration::ZERO);
        let recorder = Recorder::default();
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result = policy
            .run("getTopology", &recorder, move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 { Err(timeout_error()) } else { Ok(n) }
            })
            .await
            .unwrap();

        assert_eq!(result, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *recorder.delays.lock().unwrap(),
            vec![Duration::from_secs(2), Duration::from_secs(4)]
        );
        assert_eq!(recorder.exhausted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_exactly_max_attempts_with_original_error() {
        let policy = RetryPolicy::default().with_jitter(Duration::ZERO);
        let recorder = Recorder::default();
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let started = Instant::now();

        let err = policy
            .run("getNodes", &recorder, move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(Error::ApiConnection {
                    message: "API connection error".into(),
                    details: None,
                })
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ApiConnection { .. }), "got {err:?}");
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(recorder.exhausted.load(Ordering::SeqCst), 5);
        // 2 + 4 + 8 + 16 seconds of backoff, no sleep after the last attempt.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(30) && elapsed < Duration::from_secs(31));
    }

    #[tokio::test(start_paused = true)]
    async fn jitter_stays_below_bound() {
        let policy = RetryPolicy::new(4, Duration::from_secs(2));
        let recorder = Recorder::default();

        let _ = policy
            .run("getTopology", &recorder, || async { Err::<(), _>(timeout_error()) })
            .await;

        let delays = recorder.delays.lock().unwrap().clone();
        assert_eq!(delays.len(), 3);
        for (i, delay) in delays.into_iter().enumerate() {
            let base = policy.backoff(u32::try_from(i).unwrap() + 1);
            assert!(delay >= base && delay < base + Duration::from_secs(1), "{delay:?}");
        }
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::no_retry()
        };
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let err = policy
            .run("getTopology", &TracingObserver, move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(timeout_error())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ApiTimeout { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
