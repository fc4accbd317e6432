//! Pattern operations for the PlanStore.

use super::PlanStore;
use crate::{
    error::{KeelError, Result},
    models::{Outcome, Pattern},
};

impl PlanStore {
    /// Retrieves a pattern by id.
    pub async fn get_pattern(&self, tenant: &str, id: u64) -> Result<Pattern> {
        let tenant = tenant.to_string();
        self.with_database(move |db| {
            db.get_pattern(&tenant, id)?
                .ok_or_else(|| KeelError::PatternNotFound {
                    tenant,
                    key: format!("id {id}"),
                })
        })
        .await
    }

    /// Retrieves the pattern bound to a stored plan.
    pub async fn get_pattern_for_plan(&self, tenant: &str, plan_id: u64) -> Result<Pattern> {
        let tenant = tenant.to_string();
        self.with_database(move |db| {
            db.get_pattern_for_plan(&tenant, plan_id)?
                .ok_or_else(|| KeelError::PatternNotFound {
                    tenant,
                    key: format!("plan {plan_id}"),
                })
        })
        .await
    }

    /// Returns the best-performing pattern for `intent`.
    ///
    /// Requires at least one recorded success and an active plan; ordered by
    /// success rate, then usage count. Reuse eligibility is the caller's
    /// decision (see [`Pattern::is_reusable`]).
    pub async fn get_best_pattern(&self, tenant: &str, intent: &str) -> Result<Pattern> {
        let tenant = tenant.to_string();
        let intent = intent.to_string();
        self.with_database(move |db| {
            db.best_pattern(&tenant, &intent)?
                .ok_or_else(|| KeelError::PatternNotFound {
                    tenant,
                    key: format!("intent '{intent}'"),
                })
        })
        .await
    }

    /// Lists the patterns of a tenant grouped by intent.
    pub async fn list_patterns(&self, tenant: &str) -> Result<Vec<Pattern>> {
        let tenant = tenant.to_string();
        self.with_database(move |db| db.list_patterns(&tenant))
            .await
    }

    /// Records a successful execution against a pattern.
    pub async fn record_success(&self, tenant: &str, pattern_id: u64) -> Result<Pattern> {
        self.record_outcome(tenant, pattern_id, Outcome::Success)
            .await
    }

    /// Records a failed execution against a pattern.
    pub async fn record_failure(&self, tenant: &str, pattern_id: u64) -> Result<Pattern> {
        self.record_outcome(tenant, pattern_id, Outcome::Failure)
            .await
    }

    pub(crate) async fn record_outcome(
        &self,
        tenant: &str,
        pattern_id: u64,
        outcome: Outcome,
    ) -> Result<Pattern> {
        let tenant = tenant.to_string();
        self.with_database(move |db| db.record_pattern_outcome(&tenant, pattern_id, outcome))
            .await
    }
}
