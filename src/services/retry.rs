// src/services/retry.rs

//! Retry executor for remote calls.
//!
//! The upstream API is flaky, so every network call goes through a
//! [`Retrier`]. Failures are logged with the target they were aimed at, the
//! executor sleeps according to its [`RetryPolicy`], and tries again until
//! the call succeeds or the policy runs out of attempts.

use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::{Backoff, RetryConfig};

/// How often, and how patiently, to retry a failing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry
    pub delay: Duration,
    /// Total attempts allowed; `None` retries forever
    pub max_attempts: Option<u32>,
    pub backoff: Backoff,
    /// Upper bound for exponential growth
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Fixed delay, unbounded attempts.
    pub fn forever(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
            backoff: Backoff::Fixed,
            max_delay: delay,
        }
    }

    /// Fixed delay, at most `max_attempts` attempts.
    pub fn fixed(delay: Duration, max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts.max(1)),
            ..Self::forever(delay)
        }
    }

    /// Delay to wait after the given (1-based) failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                self.delay.saturating_mul(factor).min(self.max_delay)
            }
        }
    }

    /// Whether another attempt is allowed after `attempt` failures.
    pub fn allows_retry(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt < max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.delay_ms),
            max_attempts: (config.max_attempts > 0).then_some(config.max_attempts),
            backoff: config.backoff,
            max_delay: Duration::from_millis(config.max_delay_ms.max(config.delay_ms)),
        }
    }
}

/// Runs async operations under a [`RetryPolicy`].
#[derive(Debug, Clone, Default)]
pub struct Retrier {
    policy: RetryPolicy,
}

impl Retrier {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Invoke `op` until it succeeds.
    ///
    /// `target` names what the call is about (e.g. `notice 7001`) and is
    /// included in every failure log line and in the exhaustion error.
    pub async fn run<T, F, Fut>(&self, target: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        log::info!("Succeeded for {} on attempt {}", target, attempt);
                    }
                    return Ok(value);
                }
                Err(error) => {
                    log::warn!("Attempt {} failed for {}: {}", attempt, target, error);

                    if !self.policy.allows_retry(attempt) {
                        log::error!("Giving up on {} after {} attempts", target, attempt);
                        return Err(AppError::ExhaustedRetries {
                            target: target.to_string(),
                            attempts: attempt,
                            last_error: error.to_string(),
                        });
                    }

                    tokio::time::sleep(self.policy.delay_for(attempt)).await;
                }
            }
        }
    }
}
