//! The error returned when a retry loop gives up.

/// Returned by the retry loop once the configured attempt limit is hit.
///
/// This is the only error the crate produces. The operation's own errors are
/// consumed by the loop (and handed to the retry observer, if one is set);
/// the last one is dropped rather than wrapped, so callers can tell
/// exhaustion apart from anything the operation reports by comparing
/// against this value.
///
/// # Examples
///
/// ```rust
/// use retry_backoff::{ExponentialBackoff, MaxAttemptsReached};
///
/// let backoff = ExponentialBackoff::builder()
///     .max_attempts(2)
///     .sleep_with(|_| {})
///     .build();
///
/// let result = backoff.retry(|| Err::<(), _>(std::io::Error::other("down")));
/// assert_eq!(result, Err(MaxAttemptsReached));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("max attempts reached")]
pub struct MaxAttemptsReached;

/// Type-erased operation error, as handed to the retry observer.
///
/// Anything convertible into it can be retried: concrete error types,
/// `Box<dyn Error + Send + Sync>`, `String` and `&str` messages, or
/// `anyhow::Error`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for retry operations.
pub type Result<T> = std::result::Result<T, MaxAttemptsReached>;
