//! The retry loop and its backoff policy.
//!
//! # Key Types
//!
//! - [`ExponentialBackoff`] - Immutable policy: delays, attempt limit, observer, sleeper
//! - [`ExponentialBackoffBuilder`] - Fluent construction with defaults
//! - [`RetryState`] - Per-call state machine (attempt counter, current delay)
//!
//! # Examples
//!
//! ```rust
//! use retry_backoff::retry::ExponentialBackoff;
//! use std::time::Duration;
//!
//! let backoff = ExponentialBackoff::builder()
//!     .max_attempts(3)
//!     .min_delay(Duration::from_millis(100))
//!     .sleep_with(|_| {})
//!     .build();
//!
//! let result = backoff.retry(|| {
//!     // Your operation here
//!     Ok::<_, std::io::Error>(42)
//! });
//! assert_eq!(result, Ok(42));
//! ```

#[cfg(feature = "tokio")]
mod asynchronous;
mod exponential;
mod state;

pub use exponential::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY, DEFAULT_MIN_DELAY, ExponentialBackoff,
    ExponentialBackoffBuilder, RetryObserver,
};
pub use state::{RetryState, Transition};
