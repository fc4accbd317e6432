//! Keel CLI Application
//!
//! Operator interface for the Keel plan library: inspect and curate plans,
//! patterns and execution history, or serve the same operations over MCP.

mod args;
mod cli;
mod mcp;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use keel_core::PlanStoreBuilder;
use log::info;
use mcp::{run_stdio_server, KeelMcpServer};
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        tenant,
        no_color,
        command,
    } = Args::parse();

    let mut builder = PlanStoreBuilder::new();
    if let Some(path) = database_file {
        builder = builder.with_database_path(path);
    }
    let store = builder
        .build()
        .await
        .context("Failed to initialize plan store")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("Keel started for tenant '{tenant}'");

    match command {
        Some(Plan { command }) => {
            Cli::new(store, renderer, tenant)
                .handle_plan_command(command)
                .await
        }
        Some(Pattern { command }) => {
            Cli::new(store, renderer, tenant)
                .handle_pattern_command(command)
                .await
        }
        Some(History(args)) => Cli::new(store, renderer, tenant).execution_history(args).await,
        Some(Serve) => {
            info!("Starting Keel MCP server");
            run_stdio_server(KeelMcpServer::new(store, tenant))
                .await
                .context("MCP server failed")
        }
        None => Cli::new(store, renderer, tenant).list_plans().await,
    }
}
