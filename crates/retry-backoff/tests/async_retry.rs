//! Behaviour of `retry_async`, run with `--features tokio`.

use retry_backoff::prelude::*;
use retry_backoff::{BoxError, TokioSleeper};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

fn always_down() -> std::future::Ready<Result<(), std::io::Error>> {
    std::future::ready(Err(std::io::Error::other("down")))
}

#[tokio::test(start_paused = true)]
async fn test_async_delays_follow_backoff() {
    let observed = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&observed);
    let backoff = ExponentialBackoff::builder()
        .min_delay(Duration::from_millis(100))
        .max_delay(Duration::from_secs(1))
        .max_attempts(7)
        .on_retry(move |_, d| recorded.lock().unwrap().push(d.as_millis()))
        .build();

    let start = Instant::now();
    let result = backoff.retry_async(always_down).await;

    assert_eq!(result, Err(MaxAttemptsReached));
    assert_eq!(
        *observed.lock().unwrap(),
        vec![100, 200, 400, 800, 1000, 1000]
    );
    assert!(start.elapsed() >= Duration::from_millis(3500));
}

#[tokio::test(start_paused = true)]
async fn test_async_success_after_failures() {
    let mut calls = 0u32;
    let backoff = ExponentialBackoff::builder()
        .min_delay(Duration::from_secs(1))
        .build();

    let result = backoff
        .retry_async(|| {
            calls += 1;
            let current = calls;
            async move {
                if current < 4 {
                    Err(std::io::Error::other("not yet"))
                } else {
                    Ok(current)
                }
            }
        })
        .await;

    assert_eq!(result, Ok(4));
}

#[tokio::test]
async fn test_async_uses_injected_blocking_sleeper() {
    let sleeps = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&sleeps);
    let backoff = ExponentialBackoff::builder()
        .min_delay(Duration::from_secs(300))
        .max_attempts(3)
        .sleep_with(move |d| recorded.lock().unwrap().push(d))
        .build();

    let start = std::time::Instant::now();
    let result = backoff.retry_async(always_down).await;

    assert_eq!(result, Err(MaxAttemptsReached));
    assert_eq!(
        *sleeps.lock().unwrap(),
        vec![Duration::from_secs(300), Duration::from_secs(600)]
    );
    assert!(start.elapsed() < Duration::from_secs(60));
}

#[tokio::test]
async fn test_async_sleeper_takes_precedence() {
    let async_sleeps = Arc::new(Mutex::new(Vec::new()));
    let blocking_sleeps = Arc::new(Mutex::new(Vec::new()));
    let async_recorded = Arc::clone(&async_sleeps);
    let blocking_recorded = Arc::clone(&blocking_sleeps);
    let backoff = ExponentialBackoff::builder()
        .min_delay(Duration::from_secs(10))
        .max_attempts(4)
        .sleep_with(move |d| blocking_recorded.lock().unwrap().push(d))
        .async_sleep_with(move |d| {
            async_recorded.lock().unwrap().push(d);
            async {}
        })
        .build();

    let result = backoff.retry_async(always_down).await;

    assert_eq!(result, Err(MaxAttemptsReached));
    assert_eq!(
        *async_sleeps.lock().unwrap(),
        [10, 20, 40].map(Duration::from_secs).to_vec()
    );
    assert!(blocking_sleeps.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_tokio_sleeper_waits_on_timer() {
    let backoff = ExponentialBackoff::builder()
        .min_delay(Duration::from_millis(250))
        .max_attempts(2)
        .async_sleeper(TokioSleeper)
        .build();

    let start = Instant::now();
    let result = backoff.retry_async(always_down).await;

    assert_eq!(result, Err(MaxAttemptsReached));
    assert!(start.elapsed() >= Duration::from_millis(250));
}

#[tokio::test]
async fn test_async_accepts_boxed_errors() {
    let backoff = ExponentialBackoff::builder()
        .max_attempts(2)
        .sleeper(NoopSleeper)
        .build();

    let result = backoff
        .retry_async(|| async { Err::<(), BoxError>("boom".into()) })
        .await;

    assert_eq!(result, Err(MaxAttemptsReached));
}
