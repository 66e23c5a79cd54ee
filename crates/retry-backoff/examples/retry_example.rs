//! Example: retrying an unreliable call with exponential backoff
//!
//! This example demonstrates:
//! 1. Succeeding after a few transient failures (real sleeps)
//! 2. Giving up after the attempt limit, with a retry observer
//! 3. Loading the tunables from a TOML snippet
//!
//! Run with:
//! ```bash
//! cargo run -p retry-backoff --example retry_example
//! ```

use retry_backoff::prelude::*;
use std::cell::Cell;
use std::error::Error;
use std::time::{Duration, Instant};

/// A simulated service that fails the first few times.
struct UnreliableService {
    attempts: Cell<u32>,
    fail_count: u32,
}

impl UnreliableService {
    fn new(fail_count: u32) -> Self {
        Self {
            attempts: Cell::new(0),
            fail_count,
        }
    }

    fn call(&self) -> Result<String, std::io::Error> {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);

        if attempt <= self.fail_count {
            println!("  Attempt {attempt}: FAILED (simulating transient error)");
            Err(std::io::Error::other(format!(
                "transient error on attempt {attempt}"
            )))
        } else {
            println!("  Attempt {attempt}: SUCCESS");
            Ok("service response".to_string())
        }
    }
}

/// Example 1: recover from transient failures
fn example_transient_failures() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 1: Recover From Transient Failures ===\n");

    let backoff = ExponentialBackoff::builder()
        .min_delay(Duration::from_millis(50))
        .max_delay(Duration::from_millis(500))
        .max_attempts(5)
        .build();

    let service = UnreliableService::new(2);
    let start = Instant::now();

    let response = backoff.retry(|| service.call())?;

    println!("\nResult: {response}");
    println!("Total time: {:?}", start.elapsed());
    println!("Expected delays: 50ms + 100ms = ~150ms");

    Ok(())
}

/// Example 2: give up after the attempt limit
fn example_exhaustion() {
    println!("\n=== Example 2: Exhaustion With A Retry Observer ===\n");

    let backoff = ExponentialBackoff::builder()
        .min_delay(Duration::from_millis(100))
        .max_delay(Duration::from_secs(1))
        .max_attempts(7)
        .on_retry(|err, delay| {
            println!(
                "  operation failed ({err}), retrying in {} ms",
                delay.as_millis()
            )
        })
        .sleeper(NoopSleeper)
        .build();

    let service = UnreliableService::new(u32::MAX);
    match backoff.retry(|| service.call()) {
        Ok(_) => unreachable!("the service never recovers"),
        Err(MaxAttemptsReached) => println!("\nretry failed: {MaxAttemptsReached}"),
    }
}

/// Example 3: tunables from a config file
fn example_config() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 3: Tunables From TOML ===\n");

    let config: BackoffConfig = toml::from_str(
        r#"
        min_delay_ms = 10
        max_delay_ms = 40
        max_attempts = 4
        "#,
    )?;
    println!("Loaded: {config:?}");

    let mut state = config.builder().build().state();
    while let retry_backoff::Transition::Retry(delay) = state.on_failure() {
        println!("  failure {} -> sleep {:?}", state.attempt(), delay);
    }
    println!("  failure {} -> give up", state.attempt());

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("==============================================");
    println!("   retry-backoff: Exponential Backoff Examples");
    println!("==============================================");

    example_transient_failures()?;
    example_exhaustion();
    example_config()?;

    println!("\n==============================================");
    println!("   All examples completed successfully!");
    println!("==============================================\n");

    Ok(())
}
