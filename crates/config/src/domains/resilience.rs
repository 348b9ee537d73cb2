// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resilience domain: retry/backoff tuning and subprocess timeouts.

use crate::value::{f64_or, u64_or};
use serde_yaml::Value;
use std::time::Duration;

/// Generic retry schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
    pub max_delay: Duration,
}

impl RetryConfig {
    /// Delay before the given retry attempt (1-based; attempt 1 has no
    /// preceding delay).
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let factor = self.backoff_factor.powi(attempt.saturating_sub(2) as i32);
        let delay = self.initial_delay.as_secs_f64() * factor;
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }
}

/// Read-through view of `resilience.*`.
#[derive(Debug, Clone, Copy)]
pub struct ResilienceConfig<'a> {
    cfg: &'a Value,
}

impl<'a> ResilienceConfig<'a> {
    pub fn new(cfg: &'a Value) -> Self {
        Self { cfg }
    }

    pub fn retry(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: u64_or(self.cfg, "resilience.retry.maxAttempts", 3) as u32,
            initial_delay: Duration::from_millis(u64_or(
                self.cfg,
                "resilience.retry.initialDelayMs",
                200,
            )),
            backoff_factor: f64_or(self.cfg, "resilience.retry.backoffFactor", 2.0),
            max_delay: Duration::from_millis(u64_or(
                self.cfg,
                "resilience.retry.maxDelayMs",
                5000,
            )),
        }
    }

    /// Bound applied to every subprocess invocation.
    pub fn subprocess_timeout(&self) -> Duration {
        Duration::from_secs(u64_or(self.cfg, "resilience.subprocessTimeoutSecs", 300))
    }
}
