//! MCP tool handler implementations

use keel_core::{params as core, PlanStore};
use log::debug;
use rmcp::model::{CallToolResult, Content};
use schemars::JsonSchema;
use serde::Deserialize;

use super::errors::to_mcp_error;

// ============================================================================
// Generic Parameter Wrapper
// ============================================================================
//
// Core params derive `JsonSchema` behind the `schema` feature but know nothing
// about MCP. `McpParams` wraps any of them transparently so serde and
// schemars pass straight through to the core type.

/// Generic MCP wrapper for core parameter types
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

pub type Id = McpParams<core::Id>;
pub type ImportPlan = McpParams<core::ImportPlan>;
pub type ValidatePlan = McpParams<core::ValidatePlan>;
pub type InstantiatePlan = McpParams<core::InstantiatePlan>;
pub type BestPattern = McpParams<core::BestPattern>;
pub type ExecutionHistory = McpParams<core::ExecutionHistory>;

pub type McpResult = Result<CallToolResult, rmcp::ErrorData>;

fn text(markdown: impl ToString) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(
        markdown.to_string(),
    )]))
}

/// Tool bodies, bound to one store and tenant
pub struct McpHandlers<'a> {
    store: &'a PlanStore,
    tenant: &'a str,
}

impl<'a> McpHandlers<'a> {
    pub fn new(store: &'a PlanStore, tenant: &'a str) -> Self {
        Self { store, tenant }
    }

    pub async fn list_plans(&self) -> McpResult {
        debug!("list_plans: tenant {}", self.tenant);
        let plans = self
            .store
            .list_plans_result(self.tenant)
            .await
            .map_err(|e| to_mcp_error("Failed to list plans", &e))?;
        text(format!("# Active Plans\n\n{plans}"))
    }

    pub async fn show_plan(&self, params: &Id) -> McpResult {
        debug!("show_plan: {params:?}");
        let plan = self
            .store
            .show_plan(self.tenant, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to show plan", &e))?;
        text(plan)
    }

    pub async fn import_plan(&self, params: &ImportPlan) -> McpResult {
        debug!("import_plan: {} bytes", params.as_ref().document.len());
        let result = self
            .store
            .import_plan(self.tenant, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to import plan", &e))?;
        text(result)
    }

    pub fn validate_plan(&self, params: &ValidatePlan) -> McpResult {
        debug!("validate_plan: {} bytes", params.as_ref().document.len());
        let report = self
            .store
            .validate_plan(params.as_ref())
            .map_err(|e| to_mcp_error("Plan document is invalid", &e))?;
        text(report)
    }

    pub async fn instantiate_plan(&self, params: &InstantiatePlan) -> McpResult {
        debug!("instantiate_plan: {params:?}");
        let plan = self
            .store
            .instantiate_plan(self.tenant, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to instantiate plan", &e))?;
        text(plan)
    }

    pub async fn delete_plan(&self, params: &Id) -> McpResult {
        debug!("delete_plan: {params:?}");
        let status = self
            .store
            .delete_plan_result(self.tenant, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to delete plan", &e))?;
        text(status)
    }

    pub async fn list_patterns(&self) -> McpResult {
        debug!("list_patterns: tenant {}", self.tenant);
        let patterns = self
            .store
            .list_patterns_result(self.tenant)
            .await
            .map_err(|e| to_mcp_error("Failed to list patterns", &e))?;
        text(format!("# Patterns\n\n{patterns}"))
    }

    pub async fn best_pattern(&self, params: &BestPattern) -> McpResult {
        debug!("best_pattern: {params:?}");
        let pattern = self
            .store
            .best_pattern(self.tenant, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("No proven pattern", &e))?;
        text(pattern)
    }

    pub async fn execution_history(&self, params: &ExecutionHistory) -> McpResult {
        debug!("execution_history: {params:?}");
        let executions = self
            .store
            .execution_history_result(self.tenant, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to load execution history", &e))?;
        text(format!(
            "# Executions of plan {}\n\n{executions}",
            params.as_ref().plan_id
        ))
    }
}

#[cfg(test)]
mod tests {
    use keel_core::PlanStoreBuilder;
    use rmcp::model::{ErrorCode, RawContent};
    use tempfile::TempDir;

    use super::*;

    const LINT_PLAN: &str = r#"{
        "intent": "code.lint",
        "description": "Lint the repository",
        "variables": [{"name": "repo_path", "type": "file_path", "required": true}],
        "steps": [{"id": 1, "subagent": "code", "action": "lint", "input": {"path": "{{repo_path}}"}}]
    }"#;

    async fn create_store() -> (TempDir, PlanStore) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = PlanStoreBuilder::new()
            .with_database_path(temp_dir.path().join("mcp.db"))
            .build()
            .await
            .expect("Failed to create store");
        (temp_dir, store)
    }

    fn params<T: JsonSchema>(inner: T) -> McpParams<T> {
        McpParams(inner)
    }

    fn first_text(result: &CallToolResult) -> String {
        match &result.content[0].raw {
            RawContent::Text(text) => text.text.clone(),
            other => panic!("expected text content, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_import_then_instantiate() {
        let (_temp_dir, store) = create_store().await;
        let handlers = McpHandlers::new(&store, "acme");

        let imported = handlers
            .import_plan(&params(core::ImportPlan {
                document: LINT_PLAN.to_string(),
            }))
            .await
            .unwrap();
        assert!(first_text(&imported).contains("Stored plan with ID: 1"));

        let preview = handlers
            .instantiate_plan(&params(core::InstantiatePlan {
                id: 1,
                variables: [("repo_path".to_string(), "/srv/app".to_string())].into(),
            }))
            .await
            .unwrap();
        assert!(first_text(&preview).contains("- `path`: /srv/app"));

        let listed = handlers.list_plans().await.unwrap();
        assert!(first_text(&listed).contains("## code.lint (ID: 1)"));
    }

    #[tokio::test]
    async fn test_missing_plan_is_invalid_params() {
        let (_temp_dir, store) = create_store().await;
        let handlers = McpHandlers::new(&store, "acme");

        let err = handlers.show_plan(&params(core::Id { id: 42 })).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_plans_are_scoped_to_tenant() {
        let (_temp_dir, store) = create_store().await;
        McpHandlers::new(&store, "acme")
            .import_plan(&params(core::ImportPlan {
                document: LINT_PLAN.to_string(),
            }))
            .await
            .unwrap();

        let other = McpHandlers::new(&store, "globex").list_plans().await.unwrap();
        assert!(first_text(&other).contains("No plans found."));
    }
}
