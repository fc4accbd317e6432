//! Error types for the plan library and execution engine.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all keel operations.
#[derive(Error, Debug)]
pub enum KeelError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Plan not found for the given tenant and ID
    #[error("Plan with ID {id} not found for tenant '{tenant}'")]
    PlanNotFound { tenant: String, id: u64 },
    /// No active plan is stored for the intent
    #[error("No plan found for intent '{intent}' (tenant '{tenant}')")]
    NoPlanForIntent { tenant: String, intent: String },
    /// Pattern not found for the given lookup key
    #[error("Pattern not found for {key} (tenant '{tenant}')")]
    PatternNotFound { tenant: String, key: String },
    /// Execution not found for the given ID
    #[error("Execution with ID {id} not found")]
    ExecutionNotFound { id: u64 },
    /// A required template variable was not supplied at instantiation
    #[error("Missing required variable '{name}'")]
    MissingVariable { name: String },
    /// Structural or semantic plan validation errors
    #[error("Invalid plan ({field}): {reason}")]
    InvalidPlan { field: String, reason: String },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    /// Plan generation through the model failed or produced garbage
    #[error("Model error: {message}")]
    Model { message: String },
    /// A subagent could not carry out a step
    #[error("Subagent '{subagent}' failed: {message}")]
    Subagent { subagent: String, message: String },
    /// A blocking task panicked or was cancelled
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> KeelError {
        KeelError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for plan validation errors.
pub struct InvalidPlanBuilder {
    field: String,
}

impl InvalidPlanBuilder {
    /// Create a new invalid plan error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> KeelError {
        KeelError::InvalidPlan {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl KeelError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for plan validation errors.
    pub fn invalid_plan(field: impl Into<String>) -> InvalidPlanBuilder {
        InvalidPlanBuilder::new(field)
    }

    /// Creates an invalid input error.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        KeelError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means "nothing stored under that key".
    ///
    /// Lookup callers use this to fall through to the next strategy
    /// (pattern, then plan, then generation) instead of failing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            KeelError::PlanNotFound { .. }
                | KeelError::NoPlanForIntent { .. }
                | KeelError::PatternNotFound { .. }
                | KeelError::ExecutionNotFound { .. }
        )
    }

    /// Whether this error was produced by plan validation or instantiation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            KeelError::InvalidPlan { .. } | KeelError::MissingVariable { .. }
        )
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| KeelError::database(message).with_source(e))
    }
}

/// Result type alias for keel operations
pub type Result<T> = std::result::Result<T, KeelError>;
