//! Database operations and SQLite management for plans, patterns and
//! executions.
//!
//! This module provides the synchronous storage layer. Every query is scoped
//! by tenant. Step and variable lists are stored as JSON text next to the
//! indexed relational columns, so lookups by `(tenant, intent)` never have to
//! deserialize step bodies.

use std::{path::Path, time::Duration};

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod execution_queries;
pub mod schema;
pub mod pattern_queries;
pub mod plan_queries;
pub mod utils;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .db_context("Failed to set busy timeout")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
