//! Plan operations for the PlanStore.

use super::PlanStore;
use crate::{
    error::{KeelError, Result},
    models::{Pattern, Plan},
    template::{self, Diagnostics},
};

fn require_tenant(tenant: &str) -> Result<()> {
    if tenant.trim().is_empty() {
        return Err(KeelError::invalid_input("tenant", "tenant must not be empty"));
    }
    Ok(())
}

impl PlanStore {
    /// Validates and persists a new plan under `plan.tenant`, together with
    /// a zeroed pattern bound to it.
    ///
    /// Any id or timestamps on the input are ignored. Validation errors abort
    /// the store; unused-variable diagnostics are only logged.
    pub async fn store_plan(&self, plan: &Plan) -> Result<(Plan, Pattern)> {
        let (stored, pattern, _) = self.store_plan_with_diagnostics(plan).await?;
        Ok((stored, pattern))
    }

    /// Like [`PlanStore::store_plan`], but hands back the validation
    /// warnings instead of dropping them.
    pub(crate) async fn store_plan_with_diagnostics(
        &self,
        plan: &Plan,
    ) -> Result<(Plan, Pattern, Diagnostics)> {
        require_tenant(&plan.tenant)?;
        let diagnostics = template::validate(plan)?;

        let plan = plan.clone();
        let (stored, pattern) = self.with_database(move |db| db.insert_plan(&plan)).await?;
        log::info!(
            "Stored plan {} for intent '{}' (tenant '{}')",
            stored.id.unwrap_or_default(),
            stored.intent,
            stored.tenant
        );
        Ok((stored, pattern, diagnostics))
    }

    /// Returns the most recently updated active plan for `intent`.
    pub async fn get_by_intent(&self, tenant: &str, intent: &str) -> Result<Plan> {
        let tenant = tenant.to_string();
        let intent = intent.to_string();
        self.with_database(move |db| {
            db.find_plan_by_intent(&tenant, &intent)?
                .ok_or(KeelError::NoPlanForIntent { tenant, intent })
        })
        .await
    }

    /// Retrieves a plan by id. Soft-deleted plans are returned with
    /// `active == false` so execution history stays dereferenceable.
    pub async fn get_plan(&self, tenant: &str, id: u64) -> Result<Plan> {
        let tenant = tenant.to_string();
        self.with_database(move |db| {
            db.get_plan(&tenant, id)?
                .ok_or(KeelError::PlanNotFound { tenant, id })
        })
        .await
    }

    /// Lists the active plans of a tenant.
    pub async fn list_plans(&self, tenant: &str) -> Result<Vec<Plan>> {
        let tenant = tenant.to_string();
        self.with_database(move |db| db.list_plans(&tenant)).await
    }

    /// Overwrites description, steps and variables of an active plan.
    pub async fn update_plan(&self, plan: &Plan) -> Result<Plan> {
        require_tenant(&plan.tenant)?;
        template::validate(plan)?;

        let plan = plan.clone();
        self.with_database(move |db| db.update_plan(&plan)).await
    }

    /// Soft-deletes a plan.
    pub async fn delete_plan(&self, tenant: &str, id: u64) -> Result<()> {
        let tenant = tenant.to_string();
        self.with_database(move |db| db.deactivate_plan(&tenant, id))
            .await?;
        log::info!("Deactivated plan {id}");
        Ok(())
    }
}
