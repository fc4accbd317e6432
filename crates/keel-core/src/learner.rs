//! Pattern learner: turns execution outcomes into pattern statistics.

use crate::{
    config::EngineConfig,
    error::Result,
    models::{Execution, ExecutionStatus, Outcome, Pattern},
    store::PlanStore,
};

/// Records outcomes against patterns and decides reuse eligibility.
#[derive(Debug, Clone)]
pub struct PatternLearner {
    store: PlanStore,
    reuse_threshold: f64,
}

impl PatternLearner {
    pub fn new(store: PlanStore, config: &EngineConfig) -> Self {
        Self {
            store,
            reuse_threshold: config.reuse_threshold,
        }
    }

    /// Atomically folds `outcome` into the pattern's counters.
    pub async fn record(&self, tenant: &str, pattern_id: u64, outcome: Outcome) -> Result<Pattern> {
        let pattern = self.store.record_outcome(tenant, pattern_id, outcome).await?;
        log::debug!(
            "Pattern {} for '{}' now at {}/{} ({:.2})",
            pattern.id,
            pattern.intent,
            pattern.success_count,
            pattern.usage_count,
            pattern.success_rate
        );
        Ok(pattern)
    }

    /// Records the terminal outcome of an execution bound to a pattern.
    ///
    /// Executions without a pattern, still running, or cancelled record
    /// nothing and return `Ok(None)`.
    pub async fn observe(&self, execution: &Execution) -> Result<Option<Pattern>> {
        let Some(pattern_id) = execution.pattern_id else {
            return Ok(None);
        };
        let outcome = match execution.status {
            ExecutionStatus::Running => return Ok(None),
            ExecutionStatus::Completed => Outcome::Success,
            ExecutionStatus::Failed if is_cancelled(execution) => return Ok(None),
            ExecutionStatus::Failed => Outcome::Failure,
        };
        self.record(&execution.tenant, pattern_id, outcome)
            .await
            .map(Some)
    }

    /// Whether `pattern` may be reused without re-planning.
    pub fn is_reusable(&self, pattern: &Pattern) -> bool {
        pattern.is_reusable(self.reuse_threshold)
    }
}

/// Error message recorded on executions interrupted by their caller.
pub const CANCELLED_ERROR: &str = "execution cancelled";

pub(crate) fn is_cancelled(execution: &Execution) -> bool {
    execution.error.as_deref() == Some(CANCELLED_ERROR)
}
