//! Chat store implementation on SQLite.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use confab_application::ports::chat_store::{ChatStore, StoreError};
use confab_domain::{Message, Role, Session};
use rusqlite::{OptionalExtension, params};
use uuid::Uuid;

use super::db::Database;

/// [`ChatStore`] backed by the embedded SQLite database.
pub struct SqliteChatStore {
    db: Arc<Database>,
}

type SessionRow = (String, Option<String>, String, Option<i64>);
type MessageRow = (String, String, String, String, i64);

const MESSAGE_COLUMNS: &str = "id, session_id, role, content, timestamp";

impl SqliteChatStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn session_from_row(row: SessionRow) -> Result<Session, StoreError> {
        let (id, name, system_messages, enable_context) = row;
        let id = Uuid::parse_str(&id)
            .map_err(|e| StoreError::Corrupt(format!("session id {id}: {e}")))?;
        let system_messages: Vec<String> = serde_json::from_str(&system_messages)
            .map_err(|e| StoreError::Corrupt(format!("session {id} system messages: {e}")))?;
        Ok(Session::from_parts(
            id,
            name,
            system_messages,
            enable_context.map(|flag| flag != 0),
        ))
    }

    fn message_from_row(row: MessageRow) -> Result<Message, StoreError> {
        let (id, session_id, role, content, timestamp) = row;
        let id = Uuid::parse_str(&id)
            .map_err(|e| StoreError::Corrupt(format!("message id {id}: {e}")))?;
        let session_id = Uuid::parse_str(&session_id)
            .map_err(|e| StoreError::Corrupt(format!("message {id} session: {e}")))?;
        let role = Role::from_str(&role)
            .map_err(|e| StoreError::Corrupt(format!("message {id}: {e}")))?;
        let timestamp = Utc
            .timestamp_millis_opt(timestamp)
            .single()
            .ok_or_else(|| StoreError::Corrupt(format!("message {id} timestamp {timestamp}")))?;
        Ok(Message::from_parts(id, session_id, role, content, timestamp))
    }

    /// Run a message query returning rows in statement order.
    fn query_messages(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Message>, StoreError> {
        let rows = self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(sql)
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            let rows = stmt
                .query_map(params, |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                })
                .map_err(|e| StoreError::Backend(e.to_string()))?
                .collect::<Result<Vec<MessageRow>, _>>()
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            Ok(rows)
        })?;
        rows.into_iter().map(Self::message_from_row).collect()
    }
}

impl ChatStore for SqliteChatStore {
    fn session(&self, id: Uuid) -> Result<Option<Session>, StoreError> {
        let row = self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, name, system_messages, enable_context FROM sessions WHERE id = ?1",
                params![id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| StoreError::Backend(e.to_string()))
        })?;
        row.map(Self::session_from_row).transpose()
    }

    fn all_sessions(&self) -> Result<Vec<Session>, StoreError> {
        let rows = self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, name, system_messages, enable_context FROM sessions ORDER BY rowid")
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                    ))
                })
                .map_err(|e| StoreError::Backend(e.to_string()))?
                .collect::<Result<Vec<SessionRow>, _>>()
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            Ok(rows)
        })?;
        rows.into_iter().map(Self::session_from_row).collect()
    }

    fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        let system_messages = serde_json::to_string(session.system_messages())
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (id, name, system_messages, enable_context)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (id) DO UPDATE SET
                     name = excluded.name,
                     system_messages = excluded.system_messages,
                     enable_context = excluded.enable_context",
                params![
                    session.id().to_string(),
                    session.name(),
                    system_messages,
                    session.enable_context().map(i64::from),
                ],
            )
            .map_err(|e| StoreError::Backend(e.to_string()))?;
            Ok(())
        })
    }

    fn delete_session(&self, id: Uuid) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM messages WHERE session_id = ?1",
                params![id.to_string()],
            )
            .map_err(|e| StoreError::Backend(e.to_string()))?;
            let deleted = conn
                .execute("DELETE FROM sessions WHERE id = ?1", params![id.to_string()])
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            Ok(deleted > 0)
        })
    }

    fn save_message(&self, message: &Message) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, session_id, role, content, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (id) DO UPDATE SET
                     role = excluded.role,
                     content = excluded.content",
                params![
                    message.id().to_string(),
                    message.session_id().to_string(),
                    message.role().as_str(),
                    message.content(),
                    message.timestamp().timestamp_millis(),
                ],
            )
            .map_err(|e| StoreError::Backend(e.to_string()))?;
            Ok(())
        })
    }

    fn delete_message(&self, id: Uuid) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let deleted = conn
                .execute("DELETE FROM messages WHERE id = ?1", params![id.to_string()])
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            Ok(deleted > 0)
        })
    }

    fn messages_for_session(&self, session_id: Uuid) -> Result<Vec<Message>, StoreError> {
        self.query_messages(
            &format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE session_id = ?1
                 ORDER BY timestamp ASC, rowid ASC"
            ),
            params![session_id.to_string()],
        )
    }

    fn last_messages(&self, session_id: Uuid, limit: usize) -> Result<Vec<Message>, StoreError> {
        let mut messages = self.query_messages(
            &format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE session_id = ?1
                 ORDER BY timestamp DESC, rowid DESC
                 LIMIT ?2"
            ),
            params![session_id.to_string(), limit as i64],
        )?;
        messages.reverse();
        Ok(messages)
    }

    fn last_messages_before(
        &self,
        session_id: Uuid,
        limit: usize,
        before: DateTime<Utc>,
    ) -> Result<Vec<Message>, StoreError> {
        self.query_messages(
            &format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE session_id = ?1 AND timestamp < ?2
                 ORDER BY timestamp DESC, rowid DESC
                 LIMIT ?3"
            ),
            params![
                session_id.to_string(),
                before.timestamp_millis(),
                limit as i64
            ],
        )
    }

    fn delete_messages_before(
        &self,
        session_id: Uuid,
        before: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM messages WHERE session_id = ?1 AND timestamp < ?2",
                params![session_id.to_string(), before.timestamp_millis()],
            )
            .map_err(|e| StoreError::Backend(e.to_string()))
        })
    }

    fn delete_messages_after(
        &self,
        session_id: Uuid,
        after: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM messages WHERE session_id = ?1 AND timestamp > ?2",
                params![session_id.to_string(), after.timestamp_millis()],
            )
            .map_err(|e| StoreError::Backend(e.to_string()))
        })
    }

    fn clear_session_messages(&self, session_id: Uuid) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let deleted = conn
                .execute(
                    "DELETE FROM messages WHERE session_id = ?1",
                    params![session_id.to_string()],
                )
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            Ok(deleted > 0)
        })
    }
}
