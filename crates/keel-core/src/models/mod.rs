//! Data models for plans, steps, executions and patterns.
//!
//! These are plain data types shared by every layer: the template engine
//! builds and rewrites [`Plan`]s, the store persists them, the engine turns
//! them into [`Execution`]s and the learner folds outcomes into
//! [`Pattern`]s. Display implementations live in [`crate::display`].
//!
//! # Invariants
//!
//! - Step ids are contiguous `1..=N` in plan order.
//! - A step only depends on steps with a strictly smaller id.
//! - Variable names are unique within a plan.
//! - `Execution::results[k]` belongs to step `k + 1`.
//!
//! # Examples
//!
//! ```rust
//! use keel_core::models::{Outcome, Pattern, REUSE_THRESHOLD};
//! use jiff::Timestamp;
//!
//! let mut pattern = Pattern {
//!     id: 1,
//!     tenant: "acme".to_string(),
//!     intent: "code.fix_tests".to_string(),
//!     plan_id: 1,
//!     usage_count: 0,
//!     success_count: 0,
//!     failure_count: 0,
//!     success_rate: 0.0,
//!     last_used: None,
//!     last_succeeded: None,
//!     last_failed: None,
//!     created_at: Timestamp::now(),
//! };
//! pattern.record(Outcome::Success, Timestamp::now());
//! assert_eq!(pattern.success_rate, 1.0);
//! assert!(pattern.is_reusable(REUSE_THRESHOLD));
//! ```

pub mod execution;
pub mod intent;
pub mod pattern;
pub mod plan;
pub mod step;
pub mod value;


pub use execution::{Execution, ExecutionStatus, StepResult};
pub use intent::Intent;
pub use pattern::{Outcome, Pattern, REUSE_THRESHOLD};
pub use plan::{placeholder, Plan, Variable, VariableType};
pub use step::{Step, StepId, DEFAULT_STEP_TIMEOUT_SECS};
pub use value::Value;
