//! Async, tenant-scoped facade over the SQLite storage layer.
//!
//! [`PlanStore`] owns nothing but the database path. Every operation opens
//! its own [`Database`] connection on a blocking thread, so independent
//! requests can run concurrently on the tokio runtime while SQLite
//! serializes writers.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Orchestrator,  │    │    PlanStore    │    │    Database     │
//! │  Engine, CLI    │───▶│ (spawn_blocking)│───▶│   (rusqlite)    │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory resolving the database path and creating the schema
//! - [`plan_ops`]: Plan persistence, lookup by intent and soft deletion
//! - [`pattern_ops`]: Pattern lookup and outcome recording
//! - [`execution_ops`]: Execution records and history
//! - [`handlers`]: Operations returning display types for the CLI and MCP server
//!
//! # Examples
//!
//! ```rust
//! use keel_core::{template, PlanStoreBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PlanStoreBuilder::new()
//!     .with_database_path("/tmp/keel-example.db")
//!     .build()
//!     .await?;
//!
//! let mut plan = template::build("code.fix_tests", "Run and fix failing tests")
//!     .step(template::StepSpec::new("shell", "run_tests"))
//!     .build();
//! plan.tenant = "acme".to_string();
//!
//! let (stored, pattern) = store.store_plan(&plan).await?;
//! assert_eq!(pattern.plan_id, stored.id.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use tokio::task;

use crate::{db::Database, error::Result};

pub mod builder;
pub mod execution_ops;
pub mod handlers;
pub mod pattern_ops;
pub mod plan_ops;

#[cfg(test)]
mod tests;

pub use builder::PlanStoreBuilder;

/// Tenant-scoped persistence for plans, patterns and executions.
#[derive(Debug, Clone)]
pub struct PlanStore {
    pub(crate) db_path: PathBuf,
}

impl PlanStore {
    pub(crate) fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Location of the backing database file.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    /// Runs `op` against a fresh connection on the blocking pool.
    pub(crate) async fn with_database<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            op(&mut db)
        })
        .await?
    }
}
