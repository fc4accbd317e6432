//! Execution operations for the PlanStore.

use super::PlanStore;
use crate::{
    error::{KeelError, Result},
    models::Execution,
};

/// History length used when callers do not ask for a specific one.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

impl PlanStore {
    /// Persists a new execution record and returns its id.
    pub async fn create_execution(&self, execution: &Execution) -> Result<u64> {
        let execution = execution.clone();
        self.with_database(move |db| db.insert_execution(&execution))
            .await
    }

    /// Persists the current snapshot of an execution.
    pub async fn update_execution(&self, execution: &Execution) -> Result<()> {
        let execution = execution.clone();
        self.with_database(move |db| db.update_execution(&execution))
            .await
    }

    /// Retrieves an execution by id.
    pub async fn get_execution(&self, tenant: &str, id: u64) -> Result<Execution> {
        let tenant = tenant.to_string();
        self.with_database(move |db| {
            db.get_execution(&tenant, id)?
                .ok_or(KeelError::ExecutionNotFound { id })
        })
        .await
    }

    /// Returns up to `limit` executions of a plan, most recent first.
    pub async fn get_execution_history(
        &self,
        tenant: &str,
        plan_id: u64,
        limit: usize,
    ) -> Result<Vec<Execution>> {
        let tenant = tenant.to_string();
        self.with_database(move |db| db.execution_history(&tenant, plan_id, limit))
            .await
    }
}
