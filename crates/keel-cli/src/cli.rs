//! Command handlers for the `keel` CLI.
//!
//! Each handler converts its clap arguments into core params, calls the
//! matching `PlanStore` operation for the selected tenant and renders the
//! markdown result.

use anyhow::{Context, Result};
use keel_core::{
    params::{BestPattern, ExecutionHistory, Id, InstantiatePlan},
    PlanStore,
};
use log::debug;

use crate::{
    args::{HistoryArgs, PatternCommands, PlanCommands},
    renderer::TerminalRenderer,
};

pub struct Cli {
    store: PlanStore,
    renderer: TerminalRenderer,
    tenant: String,
}

impl Cli {
    pub fn new(store: PlanStore, renderer: TerminalRenderer, tenant: String) -> Self {
        Self {
            store,
            renderer,
            tenant,
        }
    }

    pub async fn handle_plan_command(&self, command: PlanCommands) -> Result<()> {
        match command {
            PlanCommands::List => self.list_plans().await,
            PlanCommands::Show(args) => self.show_plan(&args.into()).await,
            PlanCommands::Import(args) => {
                let params = args.into_params()?;
                let result = self
                    .store
                    .import_plan(&self.tenant, &params)
                    .await
                    .context("Failed to import plan")?;
                self.renderer.show(&result)
            }
            PlanCommands::Validate(args) => {
                let params = args.into_params()?;
                let report = self
                    .store
                    .validate_plan(&params)
                    .context("Plan document is invalid")?;
                self.renderer.show(&report)
            }
            PlanCommands::Instantiate(args) => self.instantiate_plan(&args.into()).await,
            PlanCommands::Delete(args) => {
                let params: Id = args.into();
                let status = self
                    .store
                    .delete_plan_result(&self.tenant, &params)
                    .await
                    .with_context(|| format!("Failed to delete plan {}", params.id))?;
                self.renderer.show(&status)
            }
        }
    }

    pub async fn handle_pattern_command(&self, command: PatternCommands) -> Result<()> {
        match command {
            PatternCommands::List => {
                let patterns = self
                    .store
                    .list_patterns_result(&self.tenant)
                    .await
                    .context("Failed to list patterns")?;
                self.renderer.show(&patterns)
            }
            PatternCommands::Best(args) => {
                let params: BestPattern = args.into();
                let pattern = self
                    .store
                    .best_pattern(&self.tenant, &params)
                    .await
                    .with_context(|| format!("No proven pattern for '{}'", params.intent))?;
                self.renderer.show(&pattern)
            }
        }
    }

    pub async fn list_plans(&self) -> Result<()> {
        debug!("Listing plans for tenant '{}'", self.tenant);
        let plans = self
            .store
            .list_plans_result(&self.tenant)
            .await
            .context("Failed to list plans")?;
        self.renderer.show(&plans)
    }

    pub async fn execution_history(&self, args: HistoryArgs) -> Result<()> {
        let params: ExecutionHistory = args.into();
        let executions = self
            .store
            .execution_history_result(&self.tenant, &params)
            .await
            .with_context(|| format!("Failed to load history for plan {}", params.plan_id))?;
        self.renderer.show(&executions)
    }

    async fn show_plan(&self, params: &Id) -> Result<()> {
        let plan = self
            .store
            .show_plan(&self.tenant, params)
            .await
            .with_context(|| format!("Failed to show plan {}", params.id))?;
        self.renderer.show(&plan)
    }

    async fn instantiate_plan(&self, params: &InstantiatePlan) -> Result<()> {
        let plan = self
            .store
            .instantiate_plan(&self.tenant, params)
            .await
            .with_context(|| format!("Failed to instantiate plan {}", params.id))?;
        self.renderer.show(&plan)
    }
}
