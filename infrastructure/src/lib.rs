//! Infrastructure layer for confab
//!
//! Adapters for the application-layer ports:
//!
//! - [`openai`] — OpenAI-compatible streaming completion transport (reqwest)
//! - [`storage`] — SQLite-backed chat store (rusqlite)
//! - [`config`] — file/env configuration with snapshot-based reload

pub mod config;
pub mod openai;
pub mod storage;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig, FileSettings};
pub use openai::OpenAiGateway;
pub use storage::{Database, SqliteChatStore};
