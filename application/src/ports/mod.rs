//! Ports (collaborator contracts) consumed by the application layer.
//!
//! Implementations (adapters) live in the infrastructure layer:
//!
//! - [`completion_gateway::CompletionGateway`] — streaming completion transport
//! - [`chat_store::ChatStore`] — session/message persistence
//! - [`settings::SettingsProvider`] — configuration snapshots

pub mod chat_store;
pub mod completion_gateway;
pub mod settings;
