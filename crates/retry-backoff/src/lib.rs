#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Retry a fallible operation with capped exponential backoff.
//!
//! The operation is called until it returns `Ok` or the attempt limit is
//! reached. After each failure the loop waits, starting at a minimum delay
//! and doubling every time up to a ceiling:
//!
//! - **Deterministic delays**: `min, 2·min, 4·min, ...` capped at `max`, no jitter
//! - **Unlimited by default**: set `max_attempts` to give up after N failures
//! - **Retry observer**: optional hook called with the error and the upcoming delay
//! - **Injectable sleeper**: swap the blocking wait per policy, e.g. in tests
//! - **Config-file friendly** tunables via [`BackoffConfig`]
//! - **Async driver** with its own injectable sleeper behind the `tokio` feature
//!
//! # Features
//!
//! - `tracing`: emit `debug` events per retry and a `warn` event on exhaustion
//! - `tokio`: enable `ExponentialBackoff::retry_async` and the async sleeper seam
//!
//! Both are off by default; run the whole test suite with
//! `cargo test --all-features`.
//!
//! # Examples
//!
//! Retry forever with the defaults (1s doubling to 60s):
//!
//! ```rust,no_run
//! # fn connect() -> Result<(), std::io::Error> { Ok(()) }
//! retry_backoff::retry(connect).unwrap();
//! ```
//!
//! Full configuration via the prelude:
//!
//! ```rust
//! use retry_backoff::prelude::*;
//! use std::time::Duration;
//!
//! let backoff = ExponentialBackoff::builder()
//!     .min_delay(Duration::from_millis(100))
//!     .max_delay(Duration::from_secs(1))
//!     .max_attempts(7)
//!     .on_retry(|_err, delay| println!("operation failed, retrying in {} ms", delay.as_millis()))
//!     .sleeper(NoopSleeper)
//!     .build();
//!
//! let result = backoff.retry(|| Err::<(), _>(std::io::Error::other("failed successfully")));
//! assert_eq!(result, Err(MaxAttemptsReached));
//! ```

pub mod config;
pub mod error;
pub mod retry;
pub mod sleep;

pub use config::BackoffConfig;
pub use error::{BoxError, MaxAttemptsReached, Result};
pub use retry::{ExponentialBackoff, ExponentialBackoffBuilder, RetryState, Transition};
pub use sleep::{NoopSleeper, Sleeper, ThreadSleeper};
#[cfg(feature = "tokio")]
pub use sleep::{AsyncSleeper, TokioSleeper};

/// Retry `operation` with the default policy until it succeeds.
///
/// Starts with a 1 second delay, doubling up to 60 seconds, with no attempt
/// limit, sleeping on the calling thread. Use [`ExponentialBackoff::builder`]
/// for anything else.
pub fn retry<T, E, F>(operation: F) -> Result<T>
where
    F: FnMut() -> std::result::Result<T, E>,
    E: Into<BoxError>,
{
    ExponentialBackoff::default().retry(operation)
}

/// Convenient re-exports of commonly used items.
///
/// Import all core items with:
///
/// ```rust
/// use retry_backoff::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::BackoffConfig;
    pub use crate::error::{BoxError, MaxAttemptsReached};
    pub use crate::retry::{ExponentialBackoff, ExponentialBackoffBuilder};
    pub use crate::sleep::{NoopSleeper, Sleeper, ThreadSleeper};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_with_defaults_returns_first_success() {
        assert_eq!(retry(|| Ok::<_, std::io::Error>("ready")), Ok("ready"));
    }

    #[test]
    fn test_retry_with_defaults_accepts_message_errors() {
        let mut calls = 0;
        let result = retry(|| {
            calls += 1;
            if calls < 2 {
                Err(format!("attempt {calls} failed"))
            } else {
                Ok(calls)
            }
        });

        assert_eq!(result, Ok(2));
    }
}
