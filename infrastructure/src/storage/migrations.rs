//! Schema migrations, tracked via `PRAGMA user_version`.

use confab_application::ports::chat_store::StoreError;
use rusqlite::Connection;
use tracing::debug;

const MIGRATIONS: &[&str] = &[
    // v1: sessions and messages
    "CREATE TABLE sessions (
         id              TEXT PRIMARY KEY,
         name            TEXT,
         system_messages TEXT NOT NULL DEFAULT '[]',
         enable_context  INTEGER
     );
     CREATE TABLE messages (
         id         TEXT PRIMARY KEY,
         session_id TEXT NOT NULL,
         role       TEXT NOT NULL,
         content    TEXT NOT NULL,
         timestamp  INTEGER NOT NULL
     );
     CREATE INDEX idx_messages_session_time ON messages (session_id, timestamp);",
];

/// Apply any migrations newer than the stored schema version.
pub fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| StoreError::Backend(format!("read schema version: {e}")))?;

    for (index, sql) in MIGRATIONS.iter().enumerate().skip(version as usize) {
        debug!(version = index + 1, "applying schema migration");
        conn.execute_batch(sql)
            .map_err(|e| StoreError::Backend(format!("migration {}: {e}", index + 1)))?;
        conn.pragma_update(None, "user_version", (index + 1) as i64)
            .map_err(|e| StoreError::Backend(format!("bump schema version: {e}")))?;
    }
    Ok(())
}
