//! Pacing between outbound calls.
//!
//! Every remote call made by a run is followed by a pause of
//! `base + uniform(0, base)`. A zero base disables pacing entirely.

use rand::Rng;
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct Pacer {
    base: Duration,
}

impl Pacer {
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    /// Pacer that never sleeps.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    /// Next delay: base plus uniform jitter in `[0, base)`.
    pub fn next_delay(&self) -> Duration {
        if self.base.is_zero() {
            return Duration::ZERO;
        }
        let spread: f64 = rand::thread_rng().gen_range(0.0..1.0);
        self.base + self.base.mul_f64(spread)
    }

    /// Sleep after a remote call.
    pub async fn pause(&self, after: &str) {
        let delay = self.next_delay();
        if delay.is_zero() {
            return;
        }
        trace!(after, delay_ms = delay.as_millis() as u64, "Pacing");
        tokio::time::sleep(delay).await;
    }
}
