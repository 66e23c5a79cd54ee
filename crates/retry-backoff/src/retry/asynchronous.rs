//! Async driver for [`ExponentialBackoff`].

use super::exponential::{ExponentialBackoff, InjectedSleeper};
use crate::error::{BoxError, Result};
use crate::sleep::{AsyncSleeper, Sleeper};
use std::future::Future;
use std::time::Duration;

impl ExponentialBackoff {
    /// Async counterpart of [`retry`](Self::retry).
    ///
    /// Attempt counting, delay growth and observer calls are identical. The
    /// wait between attempts goes through, in order of preference:
    ///
    /// 1. the [`async_sleeper`](crate::ExponentialBackoffBuilder::async_sleeper)
    ///    set on the builder,
    /// 2. the blocking [`sleeper`](crate::ExponentialBackoffBuilder::sleeper)
    ///    set on the builder, called inline on the task,
    /// 3. `tokio::time::sleep`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use retry_backoff::ExponentialBackoff;
    /// use std::time::Duration;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let backoff = ExponentialBackoff::builder()
    ///     .min_delay(Duration::from_millis(100))
    ///     .max_attempts(3)
    ///     .build();
    ///
    /// let value = backoff
    ///     .retry_async(|| async { Ok::<_, std::io::Error>(42) })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn retry_async<T, E, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<BoxError>,
    {
        let mut state = self.state();
        loop {
            let delay = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => self.on_failure(&mut state, err)?,
            };
            self.pause(delay).await;
        }
    }

    async fn pause(&self, delay: Duration) {
        match self.injected_sleeper() {
            Some(InjectedSleeper::Async(sleeper)) => AsyncSleeper::sleep(sleeper, delay).await,
            Some(InjectedSleeper::Blocking(sleeper)) => Sleeper::sleep(sleeper, delay),
            None => tokio::time::sleep(delay).await,
        }
    }
}
