//! Bounded retry with exponential backoff and a circuit breaker.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

/// Retry settings, as stored in configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per operation, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Upper bound for the backoff delay, in milliseconds.
    pub max_backoff_ms: u64,
    /// Backoff growth factor.
    pub multiplier: f64,
    /// Consecutive transient failures that open the breaker (0 disables it).
    pub breaker_threshold: u32,
    /// How long an open breaker waits before a trial attempt, in seconds.
    pub breaker_cooldown_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 64,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 60_000,
            multiplier: 2.0,
            breaker_threshold: 16,
            breaker_cooldown_secs: 120,
        }
    }
}

/// Exponential backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let millis = self.initial_backoff.as_millis() as f64 * self.multiplier.powi(exponent);
        let capped = millis.min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            multiplier: config.multiplier.max(1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    Closed,
    HalfOpen,
}

/// Circuit breaker over consecutive transient failures.
///
/// Shared across every operation of a pass, so a run of failures spanning
/// several moves still trips it.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    threshold: u32,
    cooldown: Duration,
    consecutive_failures: u32,
    state: BreakerState,
}

/// What the caller should do after a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerDecision {
    /// Keep retrying with the normal backoff.
    Retry,
    /// The breaker just opened: wait this long, then make one trial attempt.
    Cooldown(Duration),
    /// A trial attempt failed: give up.
    Trip,
}

impl CircuitBreaker {
    pub const fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            threshold,
            cooldown,
            consecutive_failures: 0,
            state: BreakerState::Closed,
        }
    }

    /// A breaker that never opens.
    pub const fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.state = BreakerState::Closed;
    }

    pub fn record_failure(&mut self) -> BreakerDecision {
        self.consecutive_failures += 1;

        match self.state {
            BreakerState::HalfOpen => BreakerDecision::Trip,
            BreakerState::Closed
                if self.threshold > 0 && self.consecutive_failures >= self.threshold =>
            {
                self.state = BreakerState::HalfOpen;
                BreakerDecision::Cooldown(self.cooldown)
            }
            BreakerState::Closed => BreakerDecision::Retry,
        }
    }
}

impl From<RetryConfig> for CircuitBreaker {
    fn from(config: RetryConfig) -> Self {
        Self::new(
            config.breaker_threshold,
            Duration::from_secs(config.breaker_cooldown_secs),
        )
    }
}

/// Run `operation` until it succeeds, fails permanently, or the policy gives up.
///
/// Only errors for which [`Error::is_transient`] holds are retried. Rate
/// limit hints from the service extend the backoff; a rate limit without a
/// hint waits the maximum backoff.
pub async fn retry_transient<T, F, Fut>(
    policy: &RetryPolicy,
    breaker: &mut CircuitBreaker,
    what: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        let err = match operation().await {
            Ok(value) => {
                breaker.record_success();
                return Ok(value);
            }
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) => e,
        };

        warn!("{what} failed (attempt {attempt}): {err}");

        let delay = match breaker.record_failure() {
            BreakerDecision::Trip => {
                return Err(Error::CircuitOpen {
                    failures: breaker.consecutive_failures(),
                    last: Box::new(err),
                })
            }
            BreakerDecision::Cooldown(cooldown) => {
                warn!(
                    "Circuit breaker open after {} failures, pausing {cooldown:?}",
                    breaker.consecutive_failures()
                );
                cooldown
            }
            BreakerDecision::Retry if attempt >= policy.max_attempts => {
                return Err(Error::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(err),
                })
            }
            BreakerDecision::Retry if err.is_rate_limited() => {
                let hint = match err {
                    Error::RateLimited {
                        retry_after_secs: Some(secs),
                    } => Duration::from_secs(secs),
                    _ => policy.max_backoff,
                };
                policy.backoff(attempt).max(hint)
            }
            BreakerDecision::Retry => policy.backoff(attempt),
        };

        tokio::time::sleep(delay).await;
    }
}
