//! Prompt assembly for one exchange cycle.
//!
//! The assembled sequence is, in order: global system messages, session
//! system messages, prior history (ascending by timestamp, only when the
//! effective context flag is on), and finally the new user message. Session
//! system messages come after the global ones so they sit closer to the user
//! turn.

use serde::Serialize;

use crate::session::entities::Session;
use crate::session::message::{Message, Role};

/// One entry of an assembled completion prompt.
///
/// Serializes as `{"role": ..., "content": ...}`, the shape the
/// OpenAI-compatible chat completion API expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Message> for PromptMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role(),
            content: message.content().to_string(),
        }
    }
}

/// Resolve the effective context-memory flag: the session override if set,
/// else the global default. A missing session inherits the default.
pub fn effective_context(session: Option<&Session>, global_default: bool) -> bool {
    session
        .and_then(|s| s.enable_context())
        .unwrap_or(global_default)
}

/// Assemble the message sequence for one exchange cycle.
///
/// `history` is expected to already be filtered by the effective context
/// flag (empty when context memory is off) and ordered ascending by
/// timestamp.
pub fn assemble_prompt(
    global_system: &[String],
    session: Option<&Session>,
    history: &[Message],
    user_text: &str,
) -> Vec<PromptMessage> {
    let session_system = session.map(Session::system_messages).unwrap_or(&[]);

    let mut prompt =
        Vec::with_capacity(global_system.len() + session_system.len() + history.len() + 1);

    for content in global_system {
        prompt.push(PromptMessage::system(content.clone()));
    }
    for content in session_system {
        prompt.push(PromptMessage::system(content.clone()));
    }
    for message in history {
        prompt.push(PromptMessage::from(message));
    }
    prompt.push(PromptMessage::user(user_text));

    prompt
}
