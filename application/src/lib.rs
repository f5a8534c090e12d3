//! Application layer for confab
//!
//! This crate contains the conversation exchange use case and the port
//! definitions its collaborators implement. It depends only on the domain
//! layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    chat_store::{ChatStore, StoreError},
    completion_gateway::{CompletionGateway, CompletionRequest, GatewayError, StreamHandle},
    settings::{Settings, SettingsProvider},
};
pub use use_cases::exchange::{ExchangeCoordinator, ExchangeError};
