//! Builder for creating and configuring PlanStore instances.

use std::path::{Path, PathBuf};

use tokio::task;

use super::PlanStore;
use crate::{
    db::Database,
    error::{KeelError, Result},
};

/// Builder for creating and configuring PlanStore instances.
#[derive(Debug, Clone, Default)]
pub struct PlanStoreBuilder {
    database_path: Option<PathBuf>,
}

impl PlanStoreBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            database_path: None,
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/keel/keel.db` or `~/.local/share/keel/keel.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Builds the store, creating the parent directory and schema.
    ///
    /// # Errors
    ///
    /// Returns `KeelError::FileSystem` if the parent directory cannot be created
    /// Returns `KeelError::Database` if database initialization fails
    pub async fn build(self) -> Result<PlanStore> {
        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| KeelError::FileSystem {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let init_path = db_path.clone();
        task::spawn_blocking(move || Database::new(&init_path).map(|_| ())).await??;

        log::debug!("Plan store ready at {}", db_path.display());
        Ok(PlanStore::new(db_path))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("keel")
            .place_data_file("keel.db")
            .map_err(|e| KeelError::XdgDirectory(e.to_string()))
    }
}
