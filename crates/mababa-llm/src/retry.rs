//! Retry policy with exponential backoff
//!
//! The policy is fixed configuration handed to the model client. A call is
//! retried only when the endpoint answers with one of the configured status
//! codes; the n-th failed attempt is followed by a sleep of
//! `initial_delay_secs * backoff_base^(n-1)` seconds.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Default attempt budget used by every MaBaba agent
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default backoff base
pub const DEFAULT_BACKOFF_BASE: f64 = 7.0;
/// Default delay before the first retry, in seconds
pub const DEFAULT_INITIAL_DELAY_SECS: f64 = 1.0;
/// Status codes treated as transient by default
pub const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 4] = [429, 500, 503, 504];

/// Retry configuration consumed by the model client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one (>= 1)
    pub max_attempts: u32,
    /// Multiplier applied per further retry (> 0)
    pub backoff_base: f64,
    /// Delay before the first retry in seconds (>= 0)
    pub initial_delay_secs: f64,
    /// HTTP status codes that trigger a retry
    pub retryable_status_codes: BTreeSet<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: DEFAULT_BACKOFF_BASE,
            initial_delay_secs: DEFAULT_INITIAL_DELAY_SECS,
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES.into_iter().collect(),
        }
    }
}

impl RetryPolicy {
    /// Create a validated policy
    pub fn new(
        max_attempts: u32,
        backoff_base: f64,
        initial_delay_secs: f64,
        retryable_status_codes: impl IntoIterator<Item = u16>,
    ) -> Result<Self> {
        let policy = Self {
            max_attempts,
            backoff_base,
            initial_delay_secs,
            retryable_status_codes: retryable_status_codes.into_iter().collect(),
        };
        policy.validate()?;
        Ok(policy)
    }

    /// A policy that never retries
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Check the policy invariants
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts < 1 {
            return Err(Error::InvalidConfig(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if !(self.backoff_base.is_finite() && self.backoff_base > 0.0) {
            return Err(Error::InvalidConfig(
                "retry.backoff_base must be a positive number".to_string(),
            ));
        }
        if !(self.initial_delay_secs.is_finite() && self.initial_delay_secs >= 0.0) {
            return Err(Error::InvalidConfig(
                "retry.initial_delay_secs must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Delay slept after the `attempt`-th failed attempt (1-based)
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_delay_secs * self.backoff_base.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Whether the status code is in the retryable set
    #[must_use]
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_status_codes.contains(&status)
    }

    /// Whether the error should trigger another attempt
    #[must_use]
    pub fn should_retry(&self, error: &Error) -> bool {
        match error {
            Error::Http { status, .. } => self.is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Sleeps between attempts; injectable so delays can be observed
#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
    /// Sleep for the given duration
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Run `operation` under `policy`
///
/// The closure receives the 1-based attempt number. Non-retryable errors are
/// returned as-is on the spot; a retryable error on the last attempt is
/// wrapped in [`Error::RetriesExhausted`].
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut operation: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Remote call succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if !policy.should_retry(&e) => {
                debug!(attempt, error = %e, "Remote call failed with non-retryable error");
                return Err(e);
            }
            Err(e) if attempt >= max_attempts => {
                warn!(attempts = attempt, error = %e, "Retry budget exhausted");
                return Err(Error::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(e),
                });
            }
            Err(e) => {
                let delay = policy.delay(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient remote error, retrying"
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
