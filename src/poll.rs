//! Fixed-count, fixed-interval polling.
//!
//! A [`PollPolicy`] owns the bound and the delay; the caller owns the terminal
//! predicate. Each check resolves to `Ok(Some(value))` when the job reached its
//! terminal state, `Ok(None)` while it is still pending, or `Err(_)` for a
//! transient failure. Transient failures are logged and count as an ordinary
//! attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    max_attempts: u32,
    interval: Duration,
}

impl PollPolicy {
    pub const fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs `check` at most `max_attempts` times, sleeping `interval` before
    /// every call (the first check is delayed too). Returns `None` once the
    /// bound is exhausted.
    pub async fn until_complete<T, E, F, Fut>(&self, mut check: F) -> Option<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
        E: Display,
    {
        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(self.interval).await;

            match check(attempt).await {
                Ok(Some(value)) => return Some(value),
                Ok(None) => debug!(attempt, "Still pending"),
                Err(err) => warn!(attempt, "Polling error: {}", err),
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    const NO_DELAY: PollPolicy = PollPolicy::new(30, Duration::ZERO);

    #[tokio::test]
    async fn test_returns_first_terminal_value() {
        let calls = AtomicU32::new(0);

        let result = NO_DELAY
            .until_complete(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 3 {
                        Ok::<_, String>(Some("done"))
                    } else {
                        Ok(None)
                    }
                }
            })
            .await;

        assert_eq!(result, Some("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_completes_on_last_attempt() {
        let result = NO_DELAY
            .until_complete(|attempt| async move {
                if attempt == 30 {
                    Ok::<_, String>(Some(attempt))
                } else {
                    Ok(None)
                }
            })
            .await;

        assert_eq!(result, Some(30));
    }

    #[tokio::test]
    async fn test_exhaustion_stops_at_bound() {
        let calls = AtomicU32::new(0);

        let result: Option<()> = NO_DELAY
            .until_complete(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, String>(None) }
            })
            .await;

        assert_eq!(result, None);
        assert_eq!(calls.load(Ordering::SeqCst), 30);
    }

    #[tokio::test]
    async fn test_transient_errors_do_not_abort() {
        let result = NO_DELAY
            .until_complete(|attempt| async move {
                match attempt {
                    1..=4 => Err(format!("connection reset on attempt {}", attempt)),
                    5 => Ok(Some("recovered")),
                    _ => Ok(None),
                }
            })
            .await;

        assert_eq!(result, Some("recovered"));
    }

    #[tokio::test]
    async fn test_zero_attempts_never_checks() {
        let calls = AtomicU32::new(0);
        let policy = PollPolicy::new(0, Duration::ZERO);

        let result: Option<()> = policy
            .until_complete(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, String>(None) }
            })
            .await;

        assert_eq!(result, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_interval_before_each_check() {
        let policy = PollPolicy::new(30, Duration::from_millis(2000));
        let start = tokio::time::Instant::now();
        let first_check = std::sync::Mutex::new(None);

        let result: Option<()> = policy
            .until_complete(|attempt| {
                if attempt == 1 {
                    *first_check.lock().unwrap() = Some(start.elapsed());
                }
                async { Ok::<_, String>(None) }
            })
            .await;

        assert_eq!(result, None);
        let first_check = first_check.lock().unwrap().unwrap();
        assert!(first_check >= Duration::from_millis(2000));
        assert!(first_check < Duration::from_millis(2100));
        let total = start.elapsed();
        assert!(total >= Duration::from_secs(60));
        assert!(total < Duration::from_secs(61));
    }
}
