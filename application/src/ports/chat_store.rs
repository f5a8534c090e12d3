//! Chat store port
//!
//! Persistence contract for sessions and messages. Saves have upsert
//! semantics keyed by entity identity.

use chrono::{DateTime, Utc};
use confab_domain::{Message, Session};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Backend(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Persistence for sessions and messages
///
/// Implementations live in the infrastructure layer. Access is
/// append-mostly; the store does not guard against concurrent external
/// writers.
pub trait ChatStore: Send + Sync {
    /// Look up a session by id.
    fn session(&self, id: Uuid) -> Result<Option<Session>, StoreError>;

    /// All sessions, in storage order.
    fn all_sessions(&self) -> Result<Vec<Session>, StoreError>;

    /// Insert or update a session, keyed by id.
    fn save_session(&self, session: &Session) -> Result<(), StoreError>;

    /// Delete a session and all of its messages. Returns whether the
    /// session existed.
    fn delete_session(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Insert or update a message, keyed by id.
    fn save_message(&self, message: &Message) -> Result<(), StoreError>;

    /// Delete a single message. Returns whether it existed.
    fn delete_message(&self, id: Uuid) -> Result<bool, StoreError>;

    /// All messages of a session, ascending by timestamp.
    fn messages_for_session(&self, session_id: Uuid) -> Result<Vec<Message>, StoreError>;

    /// The most recent `limit` messages of a session, returned ascending by
    /// timestamp.
    fn last_messages(&self, session_id: Uuid, limit: usize) -> Result<Vec<Message>, StoreError>;

    /// Up to `limit` messages older than `before`, newest first. Used for
    /// paging backwards through history.
    fn last_messages_before(
        &self,
        session_id: Uuid,
        limit: usize,
        before: DateTime<Utc>,
    ) -> Result<Vec<Message>, StoreError>;

    /// Delete all messages of a session older than `before`. Returns the
    /// number deleted.
    fn delete_messages_before(
        &self,
        session_id: Uuid,
        before: DateTime<Utc>,
    ) -> Result<usize, StoreError>;

    /// Delete all messages of a session newer than `after`. Returns the
    /// number deleted.
    fn delete_messages_after(
        &self,
        session_id: Uuid,
        after: DateTime<Utc>,
    ) -> Result<usize, StoreError>;

    /// Delete every message of a session. Returns whether any existed.
    fn clear_session_messages(&self, session_id: Uuid) -> Result<bool, StoreError>;
}
