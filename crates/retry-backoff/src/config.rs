//! Serializable backoff settings for configuration files.

use crate::retry::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY, DEFAULT_MIN_DELAY, ExponentialBackoff,
    ExponentialBackoffBuilder,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Plain-data form of the backoff tunables.
///
/// Durations are whole milliseconds so the settings read naturally in TOML
/// or JSON. Missing fields fall back to the crate defaults. Callbacks (the
/// retry observer and the sleeper) are not data and are set on the builder
/// returned by [`builder`](Self::builder).
///
/// # Example
///
/// ```
/// use retry_backoff::BackoffConfig;
///
/// let config: BackoffConfig = serde_json::from_str(r#"{ "max_attempts": 5 }"#).unwrap();
/// let backoff = config.builder().sleep_with(|_| {}).build();
///
/// assert_eq!(backoff.max_attempts(), 5);
/// assert_eq!(backoff.min_delay().as_millis(), 1000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay slept after the first failure, in milliseconds.
    pub min_delay_ms: u64,
    /// Ceiling for any single delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Failed attempts allowed before giving up; `0` retries forever.
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: millis(DEFAULT_MIN_DELAY),
            max_delay_ms: millis(DEFAULT_MAX_DELAY),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl BackoffConfig {
    /// A builder preloaded with these settings.
    pub fn builder(&self) -> ExponentialBackoffBuilder {
        ExponentialBackoff::builder()
            .min_delay(Duration::from_millis(self.min_delay_ms))
            .max_delay(Duration::from_millis(self.max_delay_ms))
            .max_attempts(self.max_attempts)
    }
}

impl From<&ExponentialBackoff> for BackoffConfig {
    fn from(backoff: &ExponentialBackoff) -> Self {
        Self {
            min_delay_ms: millis(backoff.min_delay()),
            max_delay_ms: millis(backoff.max_delay()),
            max_attempts: backoff.max_attempts(),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
