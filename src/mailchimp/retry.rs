//! Retry configuration and backoff calculation
//!
//! Delays grow exponentially from `initial_delay` and are capped at
//! `max_delay`. There is no jitter: concurrent callers that hit the same
//! rate limit retry in lockstep.

use std::time::Duration;

use crate::error::ConfigError;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry (ms)
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 1000;

/// Default ceiling for any single delay (ms)
pub const DEFAULT_MAX_DELAY_MS: u64 = 10_000;

/// Retry behaviour of the Mailchimp client.
///
/// Immutable once built; `initial_delay <= max_delay` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    max_retries: u32,
    initial_delay: Duration,
    max_delay: Duration,
}

impl RetryConfig {
    /// Create a retry configuration, rejecting a zero initial delay or a
    /// ceiling below the initial delay
    pub fn new(
        max_retries: u32,
        initial_delay_ms: u64,
        max_delay_ms: u64,
    ) -> std::result::Result<Self, ConfigError> {
        if initial_delay_ms == 0 {
            return Err(ConfigError::InvalidConfig {
                message: "retry initial delay must be greater than zero".to_string(),
            });
        }
        if initial_delay_ms > max_delay_ms {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "retry initial delay ({}ms) exceeds max delay ({}ms)",
                    initial_delay_ms, max_delay_ms
                ),
            });
        }

        Ok(Self {
            max_retries,
            initial_delay: Duration::from_millis(initial_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        })
    }

    /// A configuration that makes exactly one attempt
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Total number of network calls a request may make
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait after the given 0-indexed attempt fails
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        backoff_delay(attempt, self)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

/// `min(initial_delay * 2^attempt, max_delay)`
pub fn backoff_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let initial_ms = config.initial_delay.as_millis() as u64;
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    let delay = Duration::from_millis(initial_ms.saturating_mul(factor));
    std::cmp::min(delay, config.max_delay)
}
