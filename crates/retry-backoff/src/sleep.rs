//! Pluggable sleep primitives.
//!
//! The retry loop never calls `std::thread::sleep` directly. It goes through
//! a [`Sleeper`] owned by the backoff configuration, so tests (or callers
//! with their own cancellation scheme) can replace the wait per policy
//! instead of patching anything process-wide. The async driver has its own
//! seam, `AsyncSleeper`, behind the `tokio` feature.

#[cfg(feature = "tokio")]
use async_trait::async_trait;
use std::fmt;
#[cfg(feature = "tokio")]
use std::future::Future;
use std::time::Duration;

/// Blocks the calling thread between retry attempts.
///
/// Implemented for any `Fn(Duration) + Send + Sync` closure, so most callers
/// never need to name this trait:
///
/// ```rust
/// use retry_backoff::ExponentialBackoff;
///
/// let backoff = ExponentialBackoff::builder()
///     .sleep_with(|delay| println!("would sleep for {delay:?}"))
///     .build();
/// ```
pub trait Sleeper: Send + Sync {
    /// Suspend the current thread for (at least) `delay`.
    fn sleep(&self, delay: Duration);
}

impl<F> Sleeper for F
where
    F: Fn(Duration) + Send + Sync,
{
    fn sleep(&self, delay: Duration) {
        self(delay)
    }
}

/// The default sleeper, backed by [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// A sleeper that returns immediately.
///
/// Useful in tests where the delay values matter but the wall-clock time
/// does not.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSleeper;

impl Sleeper for NoopSleeper {
    fn sleep(&self, _delay: Duration) {}
}

impl fmt::Debug for dyn Sleeper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<sleeper>")
    }
}

/// Suspends the current task between attempts of
/// [`retry_async`](crate::ExponentialBackoff::retry_async).
///
/// Implemented for any `Fn(Duration) -> impl Future<Output = ()>` closure.
#[cfg(feature = "tokio")]
#[async_trait]
pub trait AsyncSleeper: Send + Sync {
    /// Wait for (at least) `delay` without blocking the executor.
    async fn sleep(&self, delay: Duration);
}

#[cfg(feature = "tokio")]
#[async_trait]
impl<F, Fut> AsyncSleeper for F
where
    F: Fn(Duration) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn sleep(&self, delay: Duration) {
        self(delay).await
    }
}

/// The default async sleeper, backed by [`tokio::time::sleep`].
#[cfg(feature = "tokio")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[cfg(feature = "tokio")]
#[async_trait]
impl AsyncSleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(feature = "tokio")]
impl fmt::Debug for dyn AsyncSleeper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<async sleeper>")
    }
}
