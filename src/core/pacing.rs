//! Fixed-interval pacing between probe attempts.

use crate::core::config::{pacing_delay, Config};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

/// Suspension point applied after every probe attempt.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

/// Sleeps for the same interval every time.
#[derive(Debug, Clone, Copy)]
pub struct FixedPacer {
    interval: Duration,
}

impl FixedPacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(pacing_delay(config))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl Pacer for FixedPacer {
    async fn pause(&self) {
        if self.interval.is_zero() {
            return;
        }
        tracing::trace!(target: "batch_runner", "Pacing for {:?}", self.interval);
        sleep(self.interval).await;
    }
}
