//! Markdown display for models, collections and operation results.
//!
//! Domain models implement `Display` directly; collections are wrapped in
//! newtypes so empty lists render a friendly message; operation outcomes get
//! small result structs. Every formatter emits markdown, which the CLI
//! renders with termimad and the MCP server returns as text.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │  Wrappers and   │    │    Markdown     │
//! │ (Plan, Pattern) │───▶│  Result Types   │───▶│ (Terminal/MCP)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ```rust
//! use keel_core::display::OperationStatus;
//!
//! let status = OperationStatus::success("Deleted plan 3");
//! assert_eq!(status.to_string(), "Success: Deleted plan 3\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{Executions, Patterns, Plans};
pub use datetime::{LocalDateTime, MaybeLocalDateTime};
pub use results::{ImportResult, ValidationReport};
pub use status::OperationStatus;
