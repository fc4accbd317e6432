//! MCP server implementation for Keel
//!
//! Exposes the plan library of one tenant to MCP clients over stdio. The
//! tools mirror the CLI subcommands and return the same markdown.

use anyhow::Result;
use keel_core::PlanStore;
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use tokio::signal::unix::{signal, SignalKind};

pub mod errors;
pub mod handlers;

pub use handlers::{
    BestPattern, ExecutionHistory, Id, ImportPlan, InstantiatePlan, McpResult, ValidatePlan,
};
use handlers::McpHandlers;

/// MCP server for Keel
#[derive(Clone)]
pub struct KeelMcpServer {
    store: PlanStore,
    tenant: String,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl KeelMcpServer {
    pub fn new(store: PlanStore, tenant: String) -> Self {
        Self {
            store,
            tenant,
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> McpHandlers<'_> {
        McpHandlers::new(&self.store, &self.tenant)
    }

    #[tool(
        name = "list_plans",
        description = "List the active plans in the library. Each entry shows the plan ID, its intent key (category.subcategory), description and step count."
    )]
    async fn list_plans(&self) -> McpResult {
        self.handlers().list_plans().await
    }

    #[tool(
        name = "show_plan",
        description = "Show a stored plan in full: variables with their types and defaults, and every step with its subagent, action, dependencies, timeout and input. Deactivated plans are shown too and marked as deleted."
    )]
    async fn show_plan(&self, Parameters(params): Parameters<Id>) -> McpResult {
        self.handlers().show_plan(&params).await
    }

    #[tool(
        name = "import_plan",
        description = "Store a plan given as a JSON document with 'intent', 'description', 'variables' and 'steps'. Steps reference variables with {{name}} placeholders and may depend on earlier steps by id. The plan is validated first; a pattern with zeroed statistics is created alongside it. Returns the new plan ID and any warnings."
    )]
    async fn import_plan(&self, Parameters(params): Parameters<ImportPlan>) -> McpResult {
        self.handlers().import_plan(&params).await
    }

    #[tool(
        name = "validate_plan",
        description = "Check a JSON plan document without storing it. Reports structural errors (step ids out of order, dependencies on later steps, duplicate variables), warnings for unused variables, and a rough token and cost estimate."
    )]
    async fn validate_plan(&self, Parameters(params): Parameters<ValidatePlan>) -> McpResult {
        self.handlers().validate_plan(&params)
    }

    #[tool(
        name = "instantiate_plan",
        description = "Preview a stored plan with variable values substituted into every step input. Defaults fill in omitted optional variables; a missing required variable is an error. Nothing is executed or stored."
    )]
    async fn instantiate_plan(
        &self,
        Parameters(params): Parameters<InstantiatePlan>,
    ) -> McpResult {
        self.handlers().instantiate_plan(&params).await
    }

    #[tool(
        name = "delete_plan",
        description = "Deactivate a plan so it is no longer selected for its intent. The plan, its pattern and its execution history remain readable."
    )]
    async fn delete_plan(&self, Parameters(params): Parameters<Id>) -> McpResult {
        self.handlers().delete_plan(&params).await
    }

    #[tool(
        name = "list_patterns",
        description = "List learned patterns with usage count, success rate and last use, grouped by intent."
    )]
    async fn list_patterns(&self) -> McpResult {
        self.handlers().list_patterns().await
    }

    #[tool(
        name = "best_pattern",
        description = "Show the pattern that would be reused for an intent key: the highest success rate among patterns with at least one success whose plan is still active, ties broken by usage."
    )]
    async fn best_pattern(&self, Parameters(params): Parameters<BestPattern>) -> McpResult {
        self.handlers().best_pattern(&params).await
    }

    #[tool(
        name = "execution_history",
        description = "List recent executions of a plan, newest first, with status, per-step results, token usage and cost. The limit defaults to 20."
    )]
    async fn execution_history(
        &self,
        Parameters(params): Parameters<ExecutionHistory>,
    ) -> McpResult {
        self.handlers().execution_history(&params).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for KeelMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "keel".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(format!(
                r#"Keel is a plan library for an intent-driven assistant. Requests are classified into intents such as `code.fix_tests`; each intent maps to stored plans whose steps are delegated to subagents. Keel learns which plans succeed and reuses proven ones.

## Core Concepts
- **Plans**: Ordered steps (subagent + action + input) with declared variables referenced as {{{{name}}}}
- **Patterns**: Per-intent success statistics; a pattern with at least one success and a success rate above 0.7 is reused
- **Executions**: Recorded runs of a plan with per-step results, tokens and cost

## Tools
- **Library**: list_plans, show_plan, import_plan, validate_plan, instantiate_plan, delete_plan
- **Learning**: list_patterns, best_pattern, execution_history

All tools operate on tenant '{}'."#,
                self.tenant
            )),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: KeelMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting Keel MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use keel_core::PlanStoreBuilder;
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_server_registers_every_tool() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = PlanStoreBuilder::new()
            .with_database_path(temp_dir.path().join("mcp.db"))
            .build()
            .await
            .unwrap();
        let server = KeelMcpServer::new(store, "default".to_string());

        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            [
                "best_pattern",
                "delete_plan",
                "execution_history",
                "import_plan",
                "instantiate_plan",
                "list_patterns",
                "list_plans",
                "show_plan",
                "validate_plan",
            ]
        );

        let info = server.get_info();
        assert_eq!(info.server_info.name, "keel");
        assert!(info.instructions.unwrap().contains("tenant 'default'"));
    }
}
