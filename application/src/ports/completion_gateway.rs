//! Completion gateway port
//!
//! Defines the interface for the streaming completion transport.

use async_trait::async_trait;
use confab_domain::{PromptMessage, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Errors that can occur during gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Parameters for one streaming completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<PromptMessage>,
    pub model: String,
    pub temperature: f64,
}

/// Handle for receiving streaming events from a completion request.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`. The stream terminates on
/// [`StreamEvent::Done`], [`StreamEvent::Error`], cancellation, or the
/// sender going away; it is not restartable.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Drain the stream and concatenate all deltas into the final text.
    ///
    /// Useful when streaming matters at the transport level but the caller
    /// only needs the finished answer.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                StreamEvent::Done => break,
                StreamEvent::Error(e) => return Err(GatewayError::RequestFailed(e)),
            }
        }
        Ok(full_text)
    }
}

/// Transport for streaming completions
///
/// This port defines how the application layer talks to an
/// OpenAI-compatible completion endpoint. Implementations (adapters) live in
/// the infrastructure layer.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Open one streaming completion request.
    ///
    /// Deltas arrive on the returned handle in transport order. Cancelling
    /// `cancel` stops the in-flight request; the stream then ends without a
    /// terminal event.
    async fn stream_completion(
        &self,
        request: CompletionRequest,
        cancel: CancellationToken,
    ) -> Result<StreamHandle, GatewayError>;
}
