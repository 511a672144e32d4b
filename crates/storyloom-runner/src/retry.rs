//! Exponential backoff around fallible async operations.
//!
//! The wrapper is generic over the error type; a predicate decides which
//! failures are worth another attempt. The backoff sleep is the only
//! suspension point it adds.

use std::fmt::Display;
use std::time::Duration;

use tracing::warn;

/// Backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Multiplier applied per retry.
    pub backoff_factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            backoff_factor: 2,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_factor: 1,
        }
    }

    /// Delay before retry number `retry` (zero-based):
    /// `min(initial_delay * backoff_factor^retry, max_delay)`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.backoff_factor
            .checked_pow(retry)
            .and_then(|multiplier| self.initial_delay.checked_mul(multiplier))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the retry budget is spent. The last error is returned unchanged.
pub async fn retry_with_backoff<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
    is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let mut retry: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if retry < policy.max_retries && is_retryable(&e) => {
                let delay = policy.delay_for(retry);
                retry = retry.saturating_add(1);
                warn!(
                    operation = label,
                    retry,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis(),
                    error = %e,
                    "retrying after transient failure"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
