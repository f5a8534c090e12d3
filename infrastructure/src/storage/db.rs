//! Database connection management.
//!
//! Wraps a single rusqlite Connection in a Mutex for thread-safe access and
//! configures WAL mode and recommended PRAGMAs on initialization.

use std::path::Path;
use std::sync::Mutex;

use confab_application::ports::chat_store::StoreError;
use rusqlite::Connection;
use tracing::info;

use super::migrations;

/// Thread-safe SQLite database wrapper.
///
/// The connection is wrapped in a Mutex since rusqlite's Connection is not
/// Sync. Access is short-lived per operation.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database at the given path.
    ///
    /// Creates parent directories, configures WAL mode, and runs all
    /// pending migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Backend(format!("create storage dir: {e}")))?;
        }

        let conn = Connection::open(path)
            .map_err(|e| StoreError::Backend(format!("open database: {e}")))?;
        let db = Self::init(conn)?;
        info!("chat storage opened at {}", path.display());
        Ok(db)
    }

    /// Open an in-memory database (tests, throwaway sessions).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Backend(format!("open database: {e}")))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(|e| StoreError::Backend(format!("set pragmas: {e}")))?;

        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` with the locked connection.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Backend("connection lock poisoned".to_string()))?;
        f(&conn)
    }
}
