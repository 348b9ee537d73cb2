// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic retry and timeout scaling.
//!
//! All engine timeouts and sleeps respect `TEST_TIMEOUT_MULTIPLIER` so CI
//! can stretch them uniformly.

use edison_config::RetryConfig;
use std::future::Future;
use std::time::Duration;

/// Env var scaling every internal timeout/sleep (e.g. `2.0` on slow CI).
pub const ENV_TIMEOUT_MULTIPLIER: &str = "TEST_TIMEOUT_MULTIPLIER";

/// Apply the configured multiplier to a duration.
pub fn scaled(duration: Duration) -> Duration {
    let factor = std::env::var(ENV_TIMEOUT_MULTIPLIER)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|f| *f > 0.0)
        .unwrap_or(1.0);
    duration.mul_f64(factor)
}

/// Retry an async operation per the configured schedule.
///
/// `op` is retried while it returns `Err` and attempts remain; the final
/// error surfaces unchanged.
pub async fn retry_async<T, E, F, Fut>(cfg: &RetryConfig, label: &str, mut op: F) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = cfg.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                let delay = scaled(cfg.delay_before(attempt + 1));
                tracing::warn!(%label, attempt, error = %e, ?delay, "retrying after failure");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Run an operation, substituting a fallback value on failure
/// (graceful degradation for non-critical reads).
pub async fn with_fallback<T, E, F, Fut>(label: &str, fallback: T, op: F) -> T
where
    E: std::fmt::Display,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match op().await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(%label, error = %e, "degrading to fallback");
            fallback
        }
    }
}

#[cfg(test)]
#[path = "resilience_tests.rs"]
mod tests;
