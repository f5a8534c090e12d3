//! Message entity and roles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::DomainError;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

/// One turn of text in a session (Entity).
///
/// Identity, owning session, and timestamp are fixed at creation; only the
/// content may change afterwards (user edits).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: Uuid,
    session_id: Uuid,
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new message stamped with the current time.
    pub fn new(session_id: Uuid, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Rebuild a message from stored fields.
    pub fn from_parts(
        id: Uuid,
        session_id: Uuid,
        role: Role,
        content: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            session_id,
            role,
            content,
            timestamp,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Replace the message text. Returns `true` if the content actually
    /// changed and the message needs persisting.
    pub fn set_content(&mut self, content: impl Into<String>) -> bool {
        let content = content.into();
        if self.content == content {
            return false;
        }
        self.content = content;
        true
    }
}
