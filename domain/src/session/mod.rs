//! Conversation session domain model.
//!
//! - [`entities::Session`] — a conversation context with per-session overrides
//! - [`message::Message`] — one turn of text attributed to a role
//! - [`dialogue::Dialogue`] — the question/answer pair of a finished exchange
//! - [`stream::StreamEvent`] — incremental events of a streaming completion

pub mod dialogue;
pub mod entities;
pub mod message;
pub mod stream;
