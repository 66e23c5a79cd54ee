//! Capped exponential backoff policy and its builder.

use super::state::{RetryState, Transition};
use crate::error::{BoxError, MaxAttemptsReached, Result};
#[cfg(feature = "tokio")]
use crate::sleep::AsyncSleeper;
use crate::sleep::{Sleeper, ThreadSleeper};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default delay before the first retry.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_secs(1);

/// Default ceiling for any single delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Default attempt limit (`0` = retry until success).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 0;

/// Callback invoked after a failed attempt, just before sleeping.
///
/// Receives the operation's error and the delay about to be slept. Purely
/// informational: it cannot change what the loop does next.
pub type RetryObserver = dyn Fn(&(dyn Error + Send + Sync + 'static), Duration) + Send + Sync;

/// Exponential backoff policy.
///
/// Delays start at `min_delay` and double after every sleep until they
/// reach `max_delay`, where they stay. There is no jitter, so two runs
/// against the same sequence of failures sleep for exactly the same
/// durations.
///
/// A policy is immutable once built and cheap to clone. Each call to
/// [`retry`](Self::retry) gets its own [`RetryState`], so one policy can be
/// shared between threads and reused freely.
///
/// # Examples
///
/// ```rust
/// use retry_backoff::ExponentialBackoff;
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::builder()
///     .min_delay(Duration::from_millis(100))
///     .max_delay(Duration::from_secs(1))
///     .max_attempts(7)
///     .on_retry(|err, delay| {
///         eprintln!("operation failed ({err}), retrying in {} ms", delay.as_millis());
///     })
///     .sleep_with(|_| {}) // skip the real wait
///     .build();
///
/// let mut calls = 0;
/// let result = backoff.retry(|| {
///     calls += 1;
///     if calls < 3 {
///         Err(std::io::Error::other("not yet"))
///     } else {
///         Ok(calls)
///     }
/// });
///
/// assert_eq!(result, Ok(3));
/// ```
#[derive(Clone)]
pub struct ExponentialBackoff {
    min_delay: Duration,
    max_delay: Duration,
    max_attempts: u32,
    on_retry: Option<Arc<RetryObserver>>,
    sleeper: Option<Arc<dyn Sleeper>>,
    #[cfg(feature = "tokio")]
    async_sleeper: Option<Arc<dyn AsyncSleeper>>,
}

impl ExponentialBackoff {
    /// Create a new builder for configuring exponential backoff.
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    /// Delay before the first retry.
    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Upper bound for every delay.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Failed attempts allowed before giving up; `0` means unlimited.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Start a fresh state machine for one run of this policy.
    pub fn state(&self) -> RetryState {
        RetryState::new(self.min_delay, self.max_delay, self.max_attempts)
    }

    /// Call `operation` until it returns `Ok`, sleeping between failures.
    ///
    /// With `max_attempts = N > 0` the operation runs at most `N` times and
    /// the sleeper is called at most `N - 1` times. With `max_attempts = 0`
    /// this only returns once the operation succeeds.
    ///
    /// The error type only has to convert into a [`BoxError`], so plain
    /// messages and already-boxed errors work as well as concrete types.
    ///
    /// # Returns
    /// - `Ok(T)`: the value from the first successful call
    /// - `Err(MaxAttemptsReached)`: the attempt limit was hit. The last
    ///   operation error is dropped, not wrapped.
    pub fn retry<T, E, F>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        let mut state = self.state();
        let sleeper = self.blocking_sleeper();
        loop {
            let delay = match operation() {
                Ok(value) => return Ok(value),
                Err(err) => self.on_failure(&mut state, err)?,
            };
            sleeper.sleep(delay);
        }
    }

    fn blocking_sleeper(&self) -> &dyn Sleeper {
        match &self.sleeper {
            Some(sleeper) => sleeper.as_ref(),
            None => &ThreadSleeper,
        }
    }

    /// The configured async sleeper, falling back to a configured blocking
    /// sleeper. `None` means nothing was injected.
    #[cfg(feature = "tokio")]
    pub(crate) fn injected_sleeper(&self) -> Option<InjectedSleeper<'_>> {
        match (&self.async_sleeper, &self.sleeper) {
            (Some(sleeper), _) => Some(InjectedSleeper::Async(sleeper.as_ref())),
            (None, Some(sleeper)) => Some(InjectedSleeper::Blocking(sleeper.as_ref())),
            (None, None) => None,
        }
    }

    /// Advance `state` after a failure, notify the observer, and return the
    /// delay to sleep for.
    pub(crate) fn on_failure<E>(&self, state: &mut RetryState, err: E) -> Result<Duration>
    where
        E: Into<BoxError>,
    {
        let delay = match state.on_failure() {
            Transition::Retry(delay) => delay,
            Transition::Exhausted => {
                #[cfg(feature = "tracing")]
                tracing::warn!(attempts = state.attempt(), "giving up, max attempts reached");
                return Err(MaxAttemptsReached);
            }
        };

        let err: BoxError = err.into();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempt = state.attempt(),
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "operation failed, retrying"
        );

        if let Some(on_retry) = &self.on_retry {
            on_retry(err.as_ref(), delay);
        }
        Ok(delay)
    }
}

/// A sleep primitive injected through the builder.
#[cfg(feature = "tokio")]
pub(crate) enum InjectedSleeper<'a> {
    Async(&'a dyn AsyncSleeper),
    Blocking(&'a dyn Sleeper),
}

impl Default for ExponentialBackoff {
    /// Defaults: 1s first delay, 60s ceiling, unlimited attempts, real
    /// thread sleep, no observer.
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for ExponentialBackoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("ExponentialBackoff");
        debug
            .field("min_delay", &self.min_delay)
            .field("max_delay", &self.max_delay)
            .field("max_attempts", &self.max_attempts)
            .field("on_retry", &self.on_retry.as_ref().map(|_| "<observer>"))
            .field("sleeper", &self.sleeper);
        #[cfg(feature = "tokio")]
        debug.field("async_sleeper", &self.async_sleeper);
        debug.finish()
    }
}

/// Builder for configuring [`ExponentialBackoff`].
///
/// Setters can be called in any order and any number of times; the last
/// call for a given field wins. Nothing is validated: a `min_delay` above
/// `max_delay` simply means every sleep is pinned at `max_delay`.
///
/// # Examples
///
/// ```rust
/// use retry_backoff::ExponentialBackoff;
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::builder()
///     .min_delay(Duration::from_millis(250))
///     .max_delay(Duration::from_secs(30))
///     .max_attempts(5)
///     .build();
///
/// assert_eq!(backoff.max_attempts(), 5);
/// ```
#[derive(Default)]
pub struct ExponentialBackoffBuilder {
    min_delay: Option<Duration>,
    max_delay: Option<Duration>,
    max_attempts: Option<u32>,
    on_retry: Option<Arc<RetryObserver>>,
    sleeper: Option<Arc<dyn Sleeper>>,
    #[cfg(feature = "tokio")]
    async_sleeper: Option<Arc<dyn AsyncSleeper>>,
}

impl ExponentialBackoffBuilder {
    /// Set the delay slept after the first failure.
    ///
    /// Default: 1s
    pub fn min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = Some(delay);
        self
    }

    /// Set the ceiling no single delay may exceed.
    ///
    /// Default: 60s
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Limit the number of failed attempts before giving up.
    ///
    /// `0` retries forever. Default: 0
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Set a callback run after each retryable failure, before sleeping.
    ///
    /// The callback gets the operation's error and the upcoming delay.
    ///
    /// ```rust
    /// use retry_backoff::ExponentialBackoff;
    ///
    /// let backoff = ExponentialBackoff::builder()
    ///     .on_retry(|err, delay| {
    ///         if let Some(io) = err.downcast_ref::<std::io::Error>() {
    ///             eprintln!("io error {:?}, waiting {delay:?}", io.kind());
    ///         }
    ///     })
    ///     .build();
    /// ```
    pub fn on_retry<F>(mut self, observer: F) -> Self
    where
        F: Fn(&(dyn Error + Send + Sync + 'static), Duration) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(observer));
        self
    }

    /// Replace the sleep primitive.
    ///
    /// Default: [`ThreadSleeper`]. With the `tokio` feature,
    /// [`retry_async`](ExponentialBackoff::retry_async) also calls this
    /// sleeper (inline, on the task) unless an
    /// [`async_sleeper`](Self::async_sleeper) is set.
    pub fn sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Some(Arc::new(sleeper));
        self
    }

    /// Replace the sleep primitive with a closure.
    pub fn sleep_with<F>(self, sleep: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.sleeper(sleep)
    }

    /// Replace the sleep primitive used by
    /// [`retry_async`](ExponentialBackoff::retry_async).
    ///
    /// Default: `tokio::time::sleep`
    #[cfg(feature = "tokio")]
    pub fn async_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: AsyncSleeper + 'static,
    {
        self.async_sleeper = Some(Arc::new(sleeper));
        self
    }

    /// Replace the async sleep primitive with a closure returning a future.
    ///
    /// ```rust
    /// use retry_backoff::ExponentialBackoff;
    ///
    /// let backoff = ExponentialBackoff::builder()
    ///     .async_sleep_with(|delay| async move { tokio::time::sleep(delay / 2).await })
    ///     .build();
    /// ```
    #[cfg(feature = "tokio")]
    pub fn async_sleep_with<F, Fut>(self, sleep: F) -> Self
    where
        F: Fn(Duration) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.async_sleeper(sleep)
    }

    /// Build the `ExponentialBackoff` instance.
    ///
    /// Uses default values for any unset parameters.
    pub fn build(self) -> ExponentialBackoff {
        ExponentialBackoff {
            min_delay: self.min_delay.unwrap_or(DEFAULT_MIN_DELAY),
            max_delay: self.max_delay.unwrap_or(DEFAULT_MAX_DELAY),
            max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            on_retry: self.on_retry,
            sleeper: self.sleeper,
            #[cfg(feature = "tokio")]
            async_sleeper: self.async_sleeper,
        }
    }
}

impl fmt::Debug for ExponentialBackoffBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("ExponentialBackoffBuilder");
        debug
            .field("min_delay", &self.min_delay)
            .field("max_delay", &self.max_delay)
            .field("max_attempts", &self.max_attempts)
            .field("on_retry", &self.on_retry.as_ref().map(|_| "<observer>"))
            .field("sleeper", &self.sleeper);
        #[cfg(feature = "tokio")]
        debug.field("async_sleeper", &self.async_sleeper);
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn failing() -> std::result::Result<(), std::io::Error> {
        Err(std::io::Error::other("failed successfully"))
    }

    #[test]
    fn test_builder_defaults() {
        let backoff = ExponentialBackoff::builder().build();

        assert_eq!(backoff.min_delay(), Duration::from_secs(1));
        assert_eq!(backoff.max_delay(), Duration::from_secs(60));
        assert_eq!(backoff.max_attempts(), 0);
        assert!(backoff.on_retry.is_none());
    }

    #[test]
    fn test_builder_custom_values() {
        let backoff = ExponentialBackoff::builder()
            .min_delay(Duration::from_millis(200))
            .max_delay(Duration::from_secs(30))
            .max_attempts(5)
            .build();

        assert_eq!(backoff.min_delay(), Duration::from_millis(200));
        assert_eq!(backoff.max_delay(), Duration::from_secs(30));
        assert_eq!(backoff.max_attempts(), 5);
    }

    #[test]
    fn test_builder_last_setter_wins() {
        let backoff = ExponentialBackoff::builder()
            .max_attempts(3)
            .min_delay(Duration::from_secs(5))
            .max_attempts(9)
            .min_delay(Duration::from_millis(10))
            .build();

        assert_eq!(backoff.max_attempts(), 9);
        assert_eq!(backoff.state().current_delay(), Duration::from_millis(10));
    }

    #[test]
    fn test_immediate_success() {
        let sleeps = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&sleeps);
        let backoff = ExponentialBackoff::builder()
            .sleep_with(move |d| recorded.lock().unwrap().push(d))
            .build();

        let mut calls = 0;
        let result = backoff.retry(|| {
            calls += 1;
            Ok::<_, std::io::Error>(42)
        });

        assert_eq!(result, Ok(42));
        assert_eq!(calls, 1);
        assert!(sleeps.lock().unwrap().is_empty());
    }

    #[test]
    fn test_retry_success_on_third_attempt() {
        let backoff = ExponentialBackoff::builder().sleep_with(|_| {}).build();

        let mut calls = 0;
        let result = backoff.retry(|| {
            calls += 1;
            if calls < 3 {
                Err(std::io::Error::other("retry me"))
            } else {
                Ok("done")
            }
        });

        assert_eq!(result, Ok("done"));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_observer_sees_upcoming_delay_before_sleep() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let observed = Arc::clone(&events);
        let slept = Arc::clone(&events);

        let backoff = ExponentialBackoff::builder()
            .max_attempts(3)
            .on_retry(move |err, d| {
                observed
                    .lock()
                    .unwrap()
                    .push(format!("retry {err} {}", d.as_secs()))
            })
            .sleep_with(move |d| slept.lock().unwrap().push(format!("sleep {}", d.as_secs())))
            .build();

        let result = backoff.retry(failing);

        assert_eq!(result, Err(MaxAttemptsReached));
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                "retry failed successfully 1",
                "sleep 1",
                "retry failed successfully 2",
                "sleep 2",
            ]
        );
    }

    #[test]
    fn test_policy_is_reusable() {
        let sleeps = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&sleeps);
        let backoff = ExponentialBackoff::builder()
            .max_attempts(4)
            .sleep_with(move |d| recorded.lock().unwrap().push(d))
            .build();

        assert_eq!(backoff.retry(failing), Err(MaxAttemptsReached));
        let first: Vec<_> = sleeps.lock().unwrap().drain(..).collect();
        assert_eq!(backoff.clone().retry(failing), Err(MaxAttemptsReached));
        let second: Vec<_> = sleeps.lock().unwrap().drain(..).collect();

        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
    }

    #[test]
    fn test_retries_boxed_and_message_errors() {
        let backoff = ExponentialBackoff::builder()
            .max_attempts(3)
            .sleep_with(|_| {})
            .build();

        let boxed = backoff.retry(|| Err::<(), BoxError>("boom".into()));
        let message = backoff.retry(|| Err::<(), String>("boom".to_string()));
        let text = backoff.retry(|| Err::<(), &str>("boom"));

        assert_eq!(boxed, Err(MaxAttemptsReached));
        assert_eq!(message, Err(MaxAttemptsReached));
        assert_eq!(text, Err(MaxAttemptsReached));
    }

    #[test]
    fn test_unset_sleeper_falls_back_to_thread_sleep() {
        let backoff = ExponentialBackoff::builder().build();

        assert!(backoff.sleeper.is_none());
        assert!(format!("{backoff:?}").contains("sleeper: None"));
    }

    #[test]
    fn test_debug_hides_callbacks() {
        let backoff = ExponentialBackoff::builder()
            .on_retry(|_, _| {})
            .sleep_with(|_| {})
            .build();

        let debug = format!("{backoff:?}");
        assert!(debug.contains("<observer>"));
        assert!(debug.contains("<sleeper>"));
    }
}
