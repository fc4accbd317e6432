//! Interface-facing operations that return display wrapper types.
//!
//! The CLI and the MCP server both call these, so the two surfaces behave
//! identically and only differ in how they render the markdown.

use super::{execution_ops::DEFAULT_HISTORY_LIMIT, PlanStore};
use crate::{
    display::{Executions, ImportResult, OperationStatus, Patterns, Plans, ValidationReport},
    error::{KeelError, Result},
    models::{Pattern, Plan},
    params::{BestPattern, ExecutionHistory, Id, ImportPlan, InstantiatePlan, ValidatePlan},
    template,
};

/// Parses a JSON plan document, keeping only the template content.
pub fn parse_plan_document(document: &str) -> Result<Plan> {
    let mut plan: Plan = serde_json::from_str(document)?;
    plan.id = None;
    plan.tenant = String::new();
    plan.active = true;
    plan.created_at = None;
    plan.updated_at = None;
    Ok(plan)
}

impl PlanStore {
    /// Lists the active plans of a tenant.
    pub async fn list_plans_result(&self, tenant: &str) -> Result<Plans> {
        Ok(Plans(self.list_plans(tenant).await?))
    }

    /// Shows one plan, including soft-deleted ones.
    pub async fn show_plan(&self, tenant: &str, params: &Id) -> Result<Plan> {
        self.get_plan(tenant, params.id).await
    }

    /// Parses, validates and stores a plan document.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use keel_core::{params::ImportPlan, PlanStoreBuilder};
    /// # async {
    /// let store = PlanStoreBuilder::new().build().await?;
    /// let params = ImportPlan {
    ///     document: r#"{"intent": "code.lint", "description": "Lint",
    ///                   "steps": [{"id": 1, "subagent": "code", "action": "lint"}]}"#
    ///         .to_string(),
    /// };
    /// let result = store.import_plan("default", &params).await?;
    /// println!("{result}");
    /// # Result::<(), keel_core::KeelError>::Ok(())
    /// # };
    /// ```
    pub async fn import_plan(&self, tenant: &str, params: &ImportPlan) -> Result<ImportResult> {
        let mut plan = parse_plan_document(&params.document)?;
        plan.tenant = tenant.to_string();
        let (plan, pattern, diagnostics) = self.store_plan_with_diagnostics(&plan).await?;
        Ok(ImportResult {
            plan,
            pattern,
            diagnostics,
        })
    }

    /// Validates a plan document and estimates its cost without storing it.
    pub fn validate_plan(&self, params: &ValidatePlan) -> Result<ValidationReport> {
        let plan = parse_plan_document(&params.document)?;
        let diagnostics = template::validate(&plan)?;
        Ok(ValidationReport {
            estimate: template::estimate_cost(&plan),
            plan,
            diagnostics,
        })
    }

    /// Previews a stored plan instantiated with the given values.
    pub async fn instantiate_plan(&self, tenant: &str, params: &InstantiatePlan) -> Result<Plan> {
        let template = self.get_plan(tenant, params.id).await?;
        if !template.active {
            return Err(KeelError::PlanNotFound {
                tenant: tenant.to_string(),
                id: params.id,
            });
        }
        template::instantiate(&template, &params.variables)
    }

    /// Soft-deletes a plan and reports the outcome.
    pub async fn delete_plan_result(&self, tenant: &str, params: &Id) -> Result<OperationStatus> {
        self.delete_plan(tenant, params.id).await?;
        Ok(OperationStatus::success(format!(
            "Deleted plan {}. Its executions stay available in history.",
            params.id
        )))
    }

    /// Lists the patterns of a tenant.
    pub async fn list_patterns_result(&self, tenant: &str) -> Result<Patterns> {
        Ok(Patterns(self.list_patterns(tenant).await?))
    }

    /// Shows the best pattern of an intent.
    pub async fn best_pattern(&self, tenant: &str, params: &BestPattern) -> Result<Pattern> {
        if params.intent.trim().is_empty() {
            return Err(KeelError::invalid_input("intent", "intent must not be empty"));
        }
        self.get_best_pattern(tenant, &params.intent).await
    }

    /// Lists recent executions of a plan.
    pub async fn execution_history_result(
        &self,
        tenant: &str,
        params: &ExecutionHistory,
    ) -> Result<Executions> {
        let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        if limit == 0 {
            return Err(KeelError::invalid_input("limit", "limit must be at least 1"));
        }
        Ok(Executions(
            self.get_execution_history(tenant, params.plan_id, limit)
                .await?,
        ))
    }
}
