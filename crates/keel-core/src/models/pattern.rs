//! Pattern model: running statistics for a plan bound to an intent.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Success rate a pattern must exceed before its plan is reused without
/// re-planning.
pub const REUSE_THRESHOLD: f64 = 0.7;

/// Terminal outcome of an execution, as seen by the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

/// Per-(tenant, intent) usage statistics bound to one plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pattern {
    pub id: u64,
    pub tenant: String,
    pub intent: String,
    pub plan_id: u64,
    pub usage_count: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub success_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_succeeded: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_failed: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Pattern {
    /// Folds one outcome into the counters.
    ///
    /// The rate is `success_count / usage_count` computed after the
    /// increment, with no decay.
    pub fn record(&mut self, outcome: Outcome, now: Timestamp) {
        self.usage_count += 1;
        match outcome {
            Outcome::Success => {
                self.success_count += 1;
                self.last_succeeded = Some(now);
            }
            Outcome::Failure => {
                self.failure_count += 1;
                self.last_failed = Some(now);
            }
        }
        self.success_rate = self.success_count as f64 / self.usage_count as f64;
        self.last_used = Some(now);
    }

    /// Whether the bound plan may be reused without re-planning.
    pub fn is_reusable(&self, threshold: f64) -> bool {
        self.success_count > 0 && self.success_rate > threshold
    }
}
