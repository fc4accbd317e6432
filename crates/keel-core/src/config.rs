//! Engine configuration.

use std::time::Duration;

use crate::{models::REUSE_THRESHOLD, template::PRICE_PER_TOKEN};

/// Timeout applied to steps that declare a timeout of zero.
pub const FALLBACK_STEP_TIMEOUT: Duration = Duration::from_secs(300);

/// Tunables shared by the engine, learner and orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Success rate a pattern must exceed to be reused
    pub reuse_threshold: f64,
    /// Used when a step's own timeout is zero
    pub fallback_step_timeout: Duration,
    /// Advisory price used for cost estimates
    pub price_per_token: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reuse_threshold: REUSE_THRESHOLD,
            fallback_step_timeout: FALLBACK_STEP_TIMEOUT,
            price_per_token: PRICE_PER_TOKEN,
        }
    }
}

impl EngineConfig {
    pub fn with_reuse_threshold(mut self, threshold: f64) -> Self {
        self.reuse_threshold = threshold;
        self
    }

    pub fn with_fallback_step_timeout(mut self, timeout: Duration) -> Self {
        self.fallback_step_timeout = timeout;
        self
    }

    pub fn with_price_per_token(mut self, price: f64) -> Self {
        self.price_per_token = price;
        self
    }

    /// Effective timeout for a step declaring `seconds`.
    pub fn step_timeout(&self, seconds: u64) -> Duration {
        if seconds == 0 {
            self.fallback_step_timeout
        } else {
            Duration::from_secs(seconds)
        }
    }
}
