//! The per-call backoff state machine.

use std::time::Duration;

/// What the retry loop should do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Sleep for this long, then call the operation again.
    Retry(Duration),
    /// The attempt limit was hit; stop and report exhaustion.
    Exhausted,
}

/// Mutable bookkeeping for a single run of the retry loop.
///
/// Every call to [`ExponentialBackoff::retry`](super::ExponentialBackoff::retry)
/// starts from a fresh `RetryState`, so concurrent or repeated runs of the
/// same policy never share counters. It is public for callers who want to
/// drive their own loop, e.g. around an API that is neither a plain closure
/// nor a future.
///
/// # Delay Sequence
///
/// Starting from `min_delay = m` and `max_delay = M`, the delays handed out
/// are `min(m, M)`, then each one is `min(2 * previous, M)`:
///
/// ```text
/// m = 1s, M = 10s  =>  1s, 2s, 4s, 8s, 10s, 10s, ...
/// ```
///
/// # Examples
///
/// ```rust
/// use retry_backoff::{ExponentialBackoff, Transition};
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::builder()
///     .min_delay(Duration::from_secs(1))
///     .max_delay(Duration::from_secs(3))
///     .max_attempts(4)
///     .build();
///
/// let mut state = backoff.state();
/// assert_eq!(state.on_failure(), Transition::Retry(Duration::from_secs(1)));
/// assert_eq!(state.on_failure(), Transition::Retry(Duration::from_secs(2)));
/// assert_eq!(state.on_failure(), Transition::Retry(Duration::from_secs(3)));
/// assert_eq!(state.on_failure(), Transition::Exhausted);
/// ```
#[derive(Debug, Clone)]
pub struct RetryState {
    max_delay: Duration,
    max_attempts: u32,
    attempt: u32,
    current_delay: Duration,
}

impl RetryState {
    /// Create a state for a fresh run.
    ///
    /// `max_attempts == 0` means the loop never gives up on its own.
    pub fn new(min_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            max_delay,
            max_attempts,
            attempt: 0,
            current_delay: min_delay,
        }
    }

    /// Record a failed attempt and decide what happens next.
    ///
    /// On [`Transition::Retry`] the returned delay is the one the caller must
    /// sleep for now; the state has already moved on to the next delay.
    pub fn on_failure(&mut self) -> Transition {
        self.attempt = self.attempt.saturating_add(1);
        if self.max_attempts > 0 && self.attempt >= self.max_attempts {
            return Transition::Exhausted;
        }

        let delay = self.current_delay.min(self.max_delay);
        if self.current_delay < self.max_delay {
            self.current_delay = self.current_delay.saturating_mul(2).min(self.max_delay);
        }
        Transition::Retry(delay)
    }

    /// Number of failed attempts recorded so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// The delay the next [`Transition::Retry`] will carry.
    pub fn current_delay(&self) -> Duration {
        self.current_delay.min(self.max_delay)
    }

    /// Whether this run will ever stop on its own.
    pub fn is_unbounded(&self) -> bool {
        self.max_attempts == 0
    }
}
