//! Bounded polling for conditions in the driven app.
//!
//! Nothing in a run is retried implicitly. Every wait goes through
//! [`poll_until`] with an explicit cadence and deadline, whether it is an
//! element lookup, the in-app refresh, or the automation server coming up.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use evscrape_core::{poll_until, Error, PollConfig};
//!
//! # async fn example() -> Result<(), Error> {
//! let config = PollConfig::new(Duration::from_millis(10), Duration::from_secs(1));
//! let value = poll_until(&config, "answer", || async { Ok(Some(42)) }).await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Cadence and deadline of a polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between two probes.
    pub interval: Duration,
    /// Overall deadline, measured from the first probe.
    pub timeout: Duration,
}

impl PollConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Element lookup policy: retry every 500 ms until `wait` elapses.
    pub fn implicit_wait(wait: Duration) -> Self {
        Self::new(Duration::from_millis(500), wait)
    }

    /// In-app refresh policy: check once per second until `timeout`.
    pub fn refresh(timeout: Duration) -> Self {
        Self::new(Duration::from_secs(1), timeout)
    }

    /// Automation server startup policy.
    pub fn server_startup(timeout: Duration) -> Self {
        Self::new(Duration::from_millis(250), timeout)
    }
}

/// Probe until it yields `Some`, or fail with [`Error::Timeout`].
///
/// The probe always runs at least once. The deadline is only checked
/// between probes, so a single slow probe is never interrupted. Errors
/// returned by the probe end the loop immediately; a probe that wants to
/// keep waiting on an error must map it to `Ok(None)` itself.
pub async fn poll_until<F, Fut, T>(config: &PollConfig, operation: &str, mut probe: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + config.timeout;
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        if let Some(value) = probe().await? {
            if attempts > 1 {
                debug!("{} ready after {} attempts", operation, attempts);
            }
            return Ok(value);
        }

        if Instant::now() + config.interval > deadline {
            debug!("{} gave up after {} attempts", operation, attempts);
            return Err(Error::timeout(operation, config.timeout));
        }

        trace!("{} not ready (attempt {}), retrying in {:?}", operation, attempts, config.interval);
        sleep(config.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_presets() {
        let implicit = PollConfig::implicit_wait(Duration::from_secs(60));
        assert_eq!(implicit.interval, Duration::from_millis(500));
        assert_eq!(implicit.timeout, Duration::from_secs(60));

        let refresh = PollConfig::refresh(Duration::from_secs(30));
        assert_eq!(refresh.interval, Duration::from_secs(1));
        assert_eq!(refresh.timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_poll_immediate_success() {
        let config = PollConfig::refresh(Duration::from_secs(5));
        let result = poll_until(&config, "test", || async { Ok(Some(42)) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_eventual_success() {
        let config = PollConfig::refresh(Duration::from_secs(30));
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = Arc::clone(&attempts);

        let result = poll_until(&config, "test", || {
            let attempts = Arc::clone(&attempts_clone);
            async move {
                let count = attempts.fetch_add(1, Ordering::SeqCst);
                Ok((count >= 3).then_some("done"))
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_times_out_with_bound() {
        let config = PollConfig::refresh(Duration::from_secs(30));
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = Arc::clone(&attempts);
        let started = Instant::now();

        let result: Result<()> = poll_until(&config, "refresh", || {
            let attempts = Arc::clone(&attempts_clone);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        })
        .await;

        match result {
            Err(Error::Timeout {
                operation,
                duration,
            }) => {
                assert_eq!(operation, "refresh");
                assert_eq!(duration, Duration::from_secs(30));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        // One probe per second, never past the deadline.
        assert_eq!(attempts.load(Ordering::SeqCst), 31);
        assert!(started.elapsed() <= Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_probe_error_stops_polling() {
        let config = PollConfig::refresh(Duration::from_secs(30));
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = Arc::clone(&attempts);

        let result: Result<()> = poll_until(&config, "test", || {
            let attempts = Arc::clone(&attempts_clone);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(Error::SessionClosed)
            }
        })
        .await;

        assert!(matches!(result, Err(Error::SessionClosed)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
