//! Command-line argument definitions using clap
//!
//! Each subcommand has its own argument struct carrying the clap-specific
//! attributes (help text, aliases, value parsers). Conversions into the
//! `keel_core::params` types keep clap out of the core crate:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → PlanStore
//! ```
//!
//! Arguments that name a file convert through `into_params`, which reads the
//! document and can fail; the rest implement `From`.

use std::{
    collections::BTreeMap,
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use keel_core::params::{
    BestPattern, ExecutionHistory, Id, ImportPlan, InstantiatePlan, ValidatePlan,
};

/// Operator tool for the Keel plan library
///
/// Keel stores reusable plans per intent, learns which of them succeed and
/// replays proven ones. This CLI inspects and curates the library for one
/// tenant at a time. `keel serve` exposes the same operations over MCP
/// (Model Context Protocol) on stdio.
#[derive(Parser)]
#[command(version, about, name = "keel")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/keel/keel.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Tenant whose plans, patterns and executions are shown
    #[arg(long, global = true, default_value = "default")]
    pub tenant: String,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage stored plans
    #[command(alias = "p")]
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Inspect learned patterns
    #[command(alias = "pt")]
    Pattern {
        #[command(subcommand)]
        command: PatternCommands,
    },
    /// Show recent executions of a plan
    #[command(alias = "h")]
    History(HistoryArgs),
    /// Start the MCP server
    Serve,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// List active plans
    #[command(aliases = ["l", "ls"])]
    List,
    /// Show details of a specific plan
    #[command(alias = "s")]
    Show(ShowPlanArgs),
    /// Import a JSON plan document into the library
    #[command(alias = "i")]
    Import(ImportPlanArgs),
    /// Check a JSON plan document without storing it
    #[command(alias = "v")]
    Validate(ValidatePlanArgs),
    /// Preview a stored plan with variable values substituted
    Instantiate(InstantiatePlanArgs),
    /// Deactivate a plan (executions are kept)
    #[command(aliases = ["d", "rm"])]
    Delete(DeletePlanArgs),
}

#[derive(Subcommand)]
pub enum PatternCommands {
    /// List all patterns with their success statistics
    #[command(aliases = ["l", "ls"])]
    List,
    /// Show the best proven pattern for an intent
    #[command(alias = "b")]
    Best(BestPatternArgs),
}

#[derive(ClapArgs)]
pub struct ShowPlanArgs {
    /// ID of the plan to show
    pub id: u64,
}

impl From<ShowPlanArgs> for Id {
    fn from(val: ShowPlanArgs) -> Self {
        Id { id: val.id }
    }
}

#[derive(ClapArgs)]
pub struct DeletePlanArgs {
    /// ID of the plan to deactivate
    pub id: u64,
}

impl From<DeletePlanArgs> for Id {
    fn from(val: DeletePlanArgs) -> Self {
        Id { id: val.id }
    }
}

/// Import a plan document
///
/// The document carries `intent`, `description`, `variables` and `steps`;
/// any `id`, tenant or timestamps in it are ignored.
#[derive(ClapArgs)]
pub struct ImportPlanArgs {
    /// Path to the JSON plan document, or `-` to read standard input
    pub file: PathBuf,
}

impl ImportPlanArgs {
    pub fn into_params(self) -> Result<ImportPlan> {
        Ok(ImportPlan {
            document: read_document(&self.file)?,
        })
    }
}

#[derive(ClapArgs)]
pub struct ValidatePlanArgs {
    /// Path to the JSON plan document, or `-` to read standard input
    pub file: PathBuf,
}

impl ValidatePlanArgs {
    pub fn into_params(self) -> Result<ValidatePlan> {
        Ok(ValidatePlan {
            document: read_document(&self.file)?,
        })
    }
}

#[derive(ClapArgs)]
pub struct InstantiatePlanArgs {
    /// ID of the stored plan
    pub id: u64,
    /// Variable value as NAME=VALUE; repeat for several variables
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_variable)]
    pub variables: Vec<(String, String)>,
}

impl From<InstantiatePlanArgs> for InstantiatePlan {
    fn from(val: InstantiatePlanArgs) -> Self {
        InstantiatePlan {
            id: val.id,
            variables: val.variables.into_iter().collect::<BTreeMap<_, _>>(),
        }
    }
}

#[derive(ClapArgs)]
pub struct BestPatternArgs {
    /// Intent key in `category.subcategory` form
    pub intent: String,
}

impl From<BestPatternArgs> for BestPattern {
    fn from(val: BestPatternArgs) -> Self {
        BestPattern { intent: val.intent }
    }
}

#[derive(ClapArgs)]
pub struct HistoryArgs {
    /// ID of the plan whose executions to list
    pub plan_id: u64,
    /// Maximum number of executions to show
    #[arg(short, long)]
    pub limit: Option<usize>,
}

impl From<HistoryArgs> for ExecutionHistory {
    fn from(val: HistoryArgs) -> Self {
        ExecutionHistory {
            plan_id: val.plan_id,
            limit: val.limit,
        }
    }
}

fn parse_variable(raw: &str) -> Result<(String, String), String> {
    let Some((name, value)) = raw.split_once('=') else {
        return Err(format!("expected NAME=VALUE, got '{raw}'"));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("variable name must not be empty in '{raw}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

fn read_document(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut document = String::new();
        io::stdin()
            .read_to_string(&mut document)
            .context("Failed to read plan document from stdin")?;
        return Ok(document);
    }
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan document '{}'", path.display()))
}
