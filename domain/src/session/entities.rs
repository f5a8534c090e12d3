//! Session entity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single ongoing conversation context (Entity).
///
/// A session layers its own overrides on top of the global settings:
/// session-scoped system messages (appended after the global ones, so they
/// sit closer to the user turn) and an optional context-memory flag.
/// `enable_context` is tri-state: `None` inherits the global default.
///
/// Mutators return `true` when the entity changed, so callers decide when to
/// persist instead of every property write hitting storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: Uuid,
    name: Option<String>,
    system_messages: Vec<String>,
    enable_context: Option<bool>,
}

impl Session {
    /// Create an unnamed session.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            system_messages: Vec::new(),
            enable_context: None,
        }
    }

    /// Create a named session.
    pub fn named(name: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.name = Some(name.into());
        session
    }

    /// Rebuild a session from stored fields.
    pub fn from_parts(
        id: Uuid,
        name: Option<String>,
        system_messages: Vec<String>,
        enable_context: Option<bool>,
    ) -> Self {
        Self {
            id,
            name,
            system_messages,
            enable_context,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn system_messages(&self) -> &[String] {
        &self.system_messages
    }

    pub fn enable_context(&self) -> Option<bool> {
        self.enable_context
    }

    /// Rename the session. Returns `true` if the name changed.
    pub fn rename(&mut self, name: Option<String>) -> bool {
        if self.name == name {
            return false;
        }
        self.name = name;
        true
    }

    /// Replace the session-scoped system messages. Returns `true` on change.
    pub fn set_system_messages(&mut self, messages: Vec<String>) -> bool {
        if self.system_messages == messages {
            return false;
        }
        self.system_messages = messages;
        true
    }

    /// Set or clear the context-memory override. Returns `true` on change.
    pub fn set_enable_context(&mut self, flag: Option<bool>) -> bool {
        if self.enable_context == flag {
            return false;
        }
        self.enable_context = flag;
        true
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
