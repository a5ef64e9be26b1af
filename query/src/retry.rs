//! Retry policy and the retry loop.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::QueryError;

/// Default number of attempts per read.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default pause between attempts (ms).
pub const DEFAULT_DELAY_MS: u64 = 1_000;
/// Default per-attempt deadline (ms).
pub const DEFAULT_ATTEMPT_TIMEOUT_MS: u64 = 5_000;
/// Ceiling on the pause between attempts (ms).
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_backoff_multiplier() -> u32 {
    1
}

fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}

fn default_attempt_timeout_ms() -> u64 {
    DEFAULT_ATTEMPT_TIMEOUT_MS
}

/// How a read is retried.
///
/// The pause before attempt `n + 1` is `delay_ms * backoff_multiplier^(n - 1)`,
/// capped at `max_delay_ms`. A multiplier of 1 gives a fixed delay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: u32,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Each attempt is abandoned after this long and counted as a failure.
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_delay_ms: default_max_delay_ms(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
        }
    }
}

impl RetryPolicy {
    /// Doubling delay starting at `delay`.
    pub fn exponential(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay_ms: delay.as_millis() as u64,
            backoff_multiplier: 2,
            ..Self::default()
        }
    }

    /// Fixed delay between attempts.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay_ms: delay.as_millis() as u64,
            backoff_multiplier: 1,
            ..Self::default()
        }
    }

    /// Single attempt, no pause.
    pub fn no_retry() -> Self {
        Self::fixed(1, Duration::ZERO)
    }

    /// Pause after the `failed`-th failed attempt (1-based).
    pub fn delay_after(&self, failed: u32) -> Duration {
        let factor = u64::from(self.backoff_multiplier.max(1))
            .saturating_pow(failed.saturating_sub(1));
        Duration::from_millis(self.delay_ms.saturating_mul(factor).min(self.max_delay_ms))
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }
}

/// Run `operation` until it succeeds or the policy's attempts are spent.
///
/// Every failure, including an attempt that overruns its deadline, is
/// retried; the final failure becomes a [`QueryError`].
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut op: F,
) -> Result<T, QueryError>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let failure = match tokio::time::timeout(policy.attempt_timeout(), op()).await {
            Ok(Ok(value)) => {
                if attempt > 1 {
                    debug!(operation, attempt, "query succeeded after retry");
                }
                return Ok(value);
            }
            Ok(Err(e)) => Some(e.to_string()),
            Err(_) => None,
        };

        if attempt >= max_attempts {
            return Err(match failure {
                Some(last_error) => QueryError::Exhausted {
                    operation,
                    attempts: attempt,
                    last_error,
                },
                None => QueryError::TimedOut {
                    operation,
                    attempts: attempt,
                },
            });
        }

        let pause = policy.delay_after(attempt);
        warn!(
            operation,
            attempt,
            error = failure.as_deref().unwrap_or("timed out"),
            retry_in_ms = pause.as_millis() as u64,
            "query failed, retrying"
        );
        tokio::time::sleep(pause).await;
    }
}
