//! Backoff for model file downloads.
//!
//! Mirrors rate-limit and drop connections on multi-gigabyte weight files, so
//! each file fetch is retried with an exponentially growing pause. Whether an
//! error is worth another attempt is decided by the caller.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// How many times to fetch a file and how long to pause in between.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total fetch attempts, the first one included
    pub max_attempts: u32,
    /// Pause before the second attempt
    pub initial_delay: Duration,
    /// Upper bound for any single pause
    pub max_delay: Duration,
    /// Growth factor applied to the pause after each failed attempt
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Four attempts, pausing 2s, 4s and 8s.
    pub fn model_download() -> Self {
        Self::new(4, Duration::from_secs(2))
            .with_max_delay(Duration::from_secs(10))
            .with_backoff_multiplier(2.0)
    }

    /// Pause before `attempt` (0-based); none before the first.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi((attempt - 1) as i32);

        Duration::from_millis(delay_ms as u64).min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::model_download()
    }
}

/// Run `fetch` until it succeeds, `should_retry` rejects the error, or the
/// attempts run out. Returns the last error in the latter two cases.
///
/// `label` names the file in log lines, e.g. `Download en-indic/config.json`.
///
/// # Panics
/// Panics if `config.max_attempts` is 0
pub async fn with_retry_if<T, E, F, Fut, P>(
    config: &RetryConfig,
    label: &str,
    mut fetch: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    assert!(
        config.max_attempts >= 1,
        "RetryConfig.max_attempts must be >= 1, got {}",
        config.max_attempts
    );

    let mut last_error: Option<E> = None;

    for attempt in 0..config.max_attempts {
        let delay = config.delay_for_attempt(attempt);
        if !delay.is_zero() {
            debug!("{}: waiting {:?} before attempt {}", label, delay, attempt + 1);
            sleep(delay).await;
        }

        match fetch().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{}: completed on attempt {}", label, attempt + 1);
                }
                return Ok(value);
            }
            Err(e) if !should_retry(&e) => {
                debug!("{}: giving up, error is permanent: {}", label, e);
                return Err(e);
            }
            Err(e) => {
                let left = config.max_attempts - attempt - 1;
                if left > 0 {
                    warn!("{}: {} ({} attempts left)", label, e, left);
                } else {
                    warn!(
                        "{}: {} (gave up after {} attempts)",
                        label, e, config.max_attempts
                    );
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.expect("max_attempts >= 1 so the loop ran"))
}
