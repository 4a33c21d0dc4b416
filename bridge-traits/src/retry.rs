//! Bounded retry with exponential backoff and jitter.
//!
//! Only [`BridgeError::Transport`](crate::error::BridgeError::Transport)
//! failures are retried. A remote that answered (any status) is never asked
//! the same question twice.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::Result;

/// Random component added on top of the backoff delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jitter {
    /// Deterministic delays
    None,
    /// Uniform extra delay in `[0, base_delay)`
    UpToBase,
}

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for the backoff part of a delay
    pub max_delay: Duration,
    /// Whether to double the delay after each failed attempt
    pub use_exponential_backoff: bool,
    /// Random spread added to each delay
    pub jitter: Jitter,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            use_exponential_backoff: true,
            jitter: Jitter::UpToBase,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            use_exponential_backoff: false,
            jitter: Jitter::None,
        }
    }

    /// Policy with the given attempt cap and base delay, everything else default.
    pub fn with_attempts(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            ..Self::default()
        }
    }

    /// Backoff part of the delay after `failures` failed attempts (1-based).
    pub fn backoff_for(&self, failures: u32) -> Duration {
        if !self.use_exponential_backoff {
            return self.base_delay;
        }
        let exponent = failures.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(self.max_delay)
    }

    /// Full delay (backoff plus jitter) after `failures` failed attempts.
    pub fn delay_for(&self, failures: u32) -> Duration {
        let backoff = self.backoff_for(failures);
        match self.jitter {
            Jitter::None => backoff,
            Jitter::UpToBase if self.base_delay.is_zero() => backoff,
            Jitter::UpToBase => {
                let spread: f64 = rand::thread_rng().gen_range(0.0..1.0);
                backoff + self.base_delay.mul_f64(spread)
            }
        }
    }

    /// Run `attempt_fn` until it succeeds, fails permanently, or the attempt
    /// cap is reached. The last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt_fn: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match attempt_fn().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) if error.is_transient() && attempt < max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_attempts,
                        error = %error,
                        delay_ms = delay.as_millis() as u64,
                        "Transient failure, retrying"
                    );
                    sleep(delay).await;
                }
                Err(error) => {
                    if error.is_transient() {
                        warn!(operation, attempts = attempt, error = %error, "Retry attempts exhausted");
                    }
                    return Err(error);
                }
            }
        }
    }
}
