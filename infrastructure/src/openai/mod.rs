//! OpenAI-compatible completion transport.
//!
//! [`OpenAiGateway`] implements the application layer's
//! [`CompletionGateway`](confab_application::CompletionGateway) port against
//! any endpoint speaking the OpenAI chat-completions SSE protocol.

mod gateway;
pub mod protocol;

pub use gateway::OpenAiGateway;
