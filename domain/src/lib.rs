//! Domain layer for confab
//!
//! This crate contains the core conversation model: sessions, messages,
//! dialogues, streaming events, and prompt assembly. It has no dependencies
//! on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Session
//!
//! A session is one ongoing conversation context. It carries per-session
//! overrides that layer on top of the global settings: session-scoped system
//! messages and an optional context-memory flag.
//!
//! ## Exchange cycle
//!
//! One user-input-to-answer round trip. The domain side of a cycle is the
//! assembled prompt (see [`assemble_prompt`]) and the resulting [`Dialogue`];
//! the temporal behavior lives in the application layer.

pub mod core;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use crate::core::error::DomainError;
pub use prompt::{PromptMessage, assemble_prompt, effective_context};
pub use session::{
    dialogue::Dialogue,
    entities::Session,
    message::{Message, Role},
    stream::StreamEvent,
};
