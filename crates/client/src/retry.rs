//! Bounded exponential-backoff retry for idempotent reads.
//!
//! Only [`CoreError::Transient`] failures are retried. Mutations never go
//! through here: a write that timed out may still have landed.

use std::future::Future;
use std::time::Duration;

use changedesk_core::error::CoreError;
use tokio_util::sync::CancellationToken;

use crate::config::DEFAULT_RETRY_MAX_ATTEMPTS;

/// Tunable parameters for the backoff strategy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
        }
    }
}

/// Calculate the next backoff delay, clamped to `max_delay`.
pub fn next_delay(current: Duration, config: &RetryConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Worst-case wall time of a retried read: every attempt running into
/// `per_attempt`, plus every backoff sleep between them.
///
/// An outer deadline shorter than this cuts the retry loop off after the
/// first timed-out attempt.
pub fn read_budget(per_attempt: Duration, config: &RetryConfig) -> Duration {
    let attempts = config.max_attempts.max(1);
    let mut total = per_attempt.saturating_mul(attempts);
    let mut delay = config.initial_delay;
    for _ in 1..attempts {
        total = total.saturating_add(delay);
        delay = next_delay(delay, config);
    }
    total
}

/// Run `call` until it succeeds, fails permanently, runs out of attempts,
/// or `cancel` fires.
pub async fn retry_read<T, F, Fut>(
    op: &'static str,
    config: &RetryConfig,
    cancel: &CancellationToken,
    mut call: F,
) -> Result<T, CoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(CoreError::Transient(format!("{op} cancelled")));
            }
            result = call() => result,
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                tracing::warn!(
                    op,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying read",
                );
            }
            Err(e) => return Err(e),
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(CoreError::Transient(format!("{op} cancelled")));
            }
            _ = tokio::time::sleep(delay) => {}
        }

        delay = next_delay(delay, config);
    }
}
