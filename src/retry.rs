//! Bounded retry and timeout helpers
//!
//! Every wait in the suite goes through these helpers so nothing can hang:
//! a [`RetryPolicy`] always carries a total time budget and may additionally
//! cap the number of attempts.

use std::fmt::Debug;
use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::TimeoutSettings;
use crate::errors::{Error, Result};

/// Interval used by browser-side polling (selectors, URL changes)
pub const BROWSER_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Retry configuration with a fixed interval and a hard budget
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay between attempts
    pub interval: Duration,
    /// Total time budget across all attempts
    pub timeout: Duration,
    /// Optional cap on the number of attempts
    pub max_attempts: Option<u32>,
    /// Description for logging and error messages
    pub description: String,
}

impl RetryPolicy {
    pub fn new(description: impl Into<String>, interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout, max_attempts: None, description: description.into() }
    }

    /// Readiness polling as configured for bootstrap
    pub fn readiness(timeouts: &TimeoutSettings, description: impl Into<String>) -> Self {
        Self::new(description, timeouts.poll_interval(), timeouts.readiness())
    }

    /// Fast polling for in-page waits
    pub fn browser(timeout: Duration, description: impl Into<String>) -> Self {
        Self::new(description, BROWSER_POLL_INTERVAL, timeout)
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    fn exhausted(&self, attempt: u32, started: Instant) -> bool {
        started.elapsed() >= self.timeout || self.max_attempts.is_some_and(|max| attempt >= max)
    }

    fn next_sleep(&self, started: Instant) -> Duration {
        self.interval.min(self.timeout.saturating_sub(started.elapsed()))
    }

    fn give_up(&self, attempt: u32, last: Option<String>) -> Error {
        let operation = match last {
            Some(last) => format!("{} ({} attempts, last: {})", self.description, attempt, last),
            None => format!("{} ({} attempts)", self.description, attempt),
        };
        warn!(description = %self.description, attempt, "Retry exhausted its budget");
        Error::timeout(operation, self.timeout)
    }
}

/// Wrap an async operation with a hard timeout
pub async fn with_timeout<F, T>(operation: &str, duration: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_elapsed) => Err(Error::timeout(operation, duration)),
    }
}

/// Run `attempt` until it yields a value accepted by `accept`.
///
/// Errors and rejected values are both retried; once the policy's budget is
/// spent the last observation is reported in the timeout error.
pub async fn retry_until<F, Fut, T, P>(policy: &RetryPolicy, mut attempt: F, mut accept: P) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: FnMut(&T) -> bool,
    T: Debug,
{
    let started = Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;
        let last = match attempt().await {
            Ok(value) if accept(&value) => {
                if attempts > 1 {
                    debug!(attempt = attempts, description = %policy.description, "Retry succeeded");
                }
                return Ok(value);
            }
            Ok(value) => format!("{:?}", value),
            Err(e) => e.to_string(),
        };

        if policy.exhausted(attempts, started) {
            return Err(policy.give_up(attempts, Some(last)));
        }

        debug!(
            attempt = attempts,
            delay_ms = policy.interval.as_millis() as u64,
            last = %last,
            description = %policy.description,
            "Predicate not satisfied, will retry"
        );
        let sleep = policy.next_sleep(started);
        if sleep > Duration::ZERO {
            tokio::time::sleep(sleep).await;
        }
    }
}

/// Blocking counterpart of [`retry_until`] for the browser driver.
///
/// `check` returns `Ok(Some(_))` when done, `Ok(None)` to keep waiting; errors
/// are treated as "not yet" because page scripts fail while a navigation is
/// in flight.
pub fn poll_blocking<F, T>(policy: &RetryPolicy, mut check: F) -> Result<T>
where
    F: FnMut() -> Result<Option<T>>,
{
    let started = Instant::now();
    let mut attempts = 0;
    let mut last = None;

    loop {
        attempts += 1;
        match check() {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) => last = Some(e.to_string()),
        }

        if policy.exhausted(attempts, started) {
            return Err(policy.give_up(attempts, last));
        }

        let sleep = policy.next_sleep(started);
        if sleep > Duration::ZERO {
            std::thread::sleep(sleep);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tracing_test::traced_test;

    #[tokio::test]
    async fn with_timeout_passes_result_through() {
        let result = with_timeout("quick op", Duration::from_secs(1), async { Ok::<_, Error>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn with_timeout_reports_label() {
        let result = with_timeout("slow op", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<_, Error>(42)
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
        assert!(err.to_string().contains("slow op"));
    }

    #[tokio::test]
    #[traced_test]
    async fn retry_until_accepts_after_rejections() {
        let counter = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new("counter", Duration::from_millis(5), Duration::from_secs(5));

        let result = retry_until(
            &policy,
            || {
                let counter = counter.clone();
                async move { Ok::<_, Error>(counter.fetch_add(1, Ordering::SeqCst) + 1) }
            },
            |n| *n >= 3,
        )
        .await;

        assert_eq!(result.unwrap(), 3);
        assert!(logs_contain("will retry"));
    }

    #[tokio::test]
    async fn retry_until_retries_errors() {
        let counter = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new("flaky", Duration::from_millis(5), Duration::from_secs(5));

        let result = retry_until(
            &policy,
            || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(Error::browser("connection refused"))
                    } else {
                        Ok(200u16)
                    }
                }
            },
            |status| *status == 200,
        )
        .await;

        assert_eq!(result.unwrap(), 200);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_until_stops_at_max_attempts() {
        let counter = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new("never", Duration::from_millis(1), Duration::from_secs(30))
            .with_max_attempts(4);

        let err = retry_until(
            &policy,
            || {
                let counter = counter.clone();
                async move { Ok::<_, Error>(counter.fetch_add(1, Ordering::SeqCst)) }
            },
            |_| false,
        )
        .await
        .unwrap_err();

        assert_eq!(counter.load(Ordering::SeqCst), 4);
        let message = err.to_string();
        assert!(message.contains("never (4 attempts, last: 3)"), "{message}");
    }

    #[tokio::test]
    async fn retry_until_stops_at_deadline() {
        let policy = RetryPolicy::new("503 forever", Duration::from_millis(10), Duration::from_millis(50));
        let started = Instant::now();

        let err = retry_until(&policy, || async { Ok::<_, Error>(503u16) }, |s| *s == 200)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout { duration_ms: 50, .. }));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn poll_blocking_treats_errors_as_pending() {
        let mut calls = 0;
        let policy = RetryPolicy::browser(Duration::from_secs(5), "selector");

        let value = poll_blocking(&policy, || {
            calls += 1;
            match calls {
                1 => Err(Error::browser("Execution context was destroyed")),
                2 => Ok(None),
                _ => Ok(Some("found")),
            }
        })
        .unwrap();

        assert_eq!(value, "found");
        assert_eq!(calls, 3);
    }

    #[test]
    fn poll_blocking_reports_last_error_on_timeout() {
        let policy = RetryPolicy::new("url", Duration::from_millis(5), Duration::from_millis(20));
        let err = poll_blocking::<_, ()>(&policy, || Err(Error::browser("still on login page")))
            .unwrap_err();
        assert!(err.to_string().contains("still on login page"));
    }
}
