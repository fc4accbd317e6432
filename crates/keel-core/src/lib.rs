//! Plan library and execution engine for intent-driven assistants.
//!
//! Keel decides which sequence of steps should serve a classified request,
//! runs those steps through pluggable subagents, and learns which plans work
//! so identical requests can skip re-planning next time.
//!
//! # Architecture
//!
//! ```text
//! Intent ──▶ Orchestrator ──▶ PlanStore (pattern → plan) ──▶ Model (on miss)
//!                 │
//!                 ├──▶ template::instantiate ──▶ ExecutionEngine ──▶ Subagents
//!                 │                                     │
//!                 └────────────── Response ◀────────────┴──▶ PatternLearner
//! ```
//!
//! - [`models`]: Plans, steps, variables, executions and patterns
//! - [`template`]: Building, validating, instantiating and pricing plans
//! - [`db`] and [`store`]: SQLite persistence behind an async facade
//! - [`engine`]: The sequential, dependency-checked executor
//! - [`learner`]: Success and failure bookkeeping
//! - [`orchestrator`]: The request entry point
//! - [`display`]: Markdown formatting for every model
//!
//! # Quick Start
//!
//! ```rust
//! use keel_core::{models::VariableType, template::{self, StepSpec}, PlanStoreBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PlanStoreBuilder::new()
//!     .with_database_path("test.db")
//!     .build()
//!     .await?;
//!
//! let mut plan = template::build("code.fix_tests", "Run the tests and analyze failures")
//!     .required_variable("repo_path", VariableType::FilePath, "Repository root")
//!     .step(StepSpec::new("code", "run_tests").input("path", "{{repo_path}}"))
//!     .step(StepSpec::new("code", "analyze_failures").depends_on([1]))
//!     .build();
//! plan.tenant = "acme".to_string();
//!
//! let (plan, _pattern) = store.store_plan(&plan).await?;
//! println!("{plan}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod display;
pub mod engine;
pub mod error;
pub mod learner;
pub mod models;
pub mod orchestrator;
pub mod params;
pub mod store;
pub mod template;

// Re-export commonly used types
pub use config::EngineConfig;
pub use db::Database;
pub use display::{
    Executions, ImportResult, LocalDateTime, OperationStatus, Patterns, Plans, ValidationReport,
};
pub use engine::{
    ExecutionEngine, ExecutionRequest, StepRequest, Subagent, SubagentOutput, SubagentRegistry,
};
pub use error::{KeelError, Result};
pub use learner::PatternLearner;
pub use models::{
    Execution, ExecutionStatus, Intent, Outcome, Pattern, Plan, Step, StepResult, Value, Variable,
    VariableType,
};
pub use orchestrator::{Generation, Model, Orchestrator, Response, Tier};
pub use params::{BestPattern, ExecutionHistory, Id, ImportPlan, InstantiatePlan, ValidatePlan};
pub use store::{PlanStore, PlanStoreBuilder};
