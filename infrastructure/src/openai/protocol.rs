//! Wire types and SSE framing for the chat-completions protocol.

use confab_domain::PromptMessage;
use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [PromptMessage],
    pub temperature: f64,
    pub stream: bool,
}

/// One parsed SSE chunk of a streaming completion.
#[derive(Debug, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Sentinel payload that ends an SSE completion stream.
pub const DONE_MARKER: &str = "[DONE]";

/// Extract the delta text from one SSE data payload.
///
/// Returns `None` for payloads without content (role announcements, finish
/// chunks, unparseable lines — all skipped, matching lenient clients).
pub fn delta_content(data: &str) -> Option<String> {
    let chunk: StreamChunk = serde_json::from_str(data).ok()?;
    chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty())
}

/// Incremental splitter for SSE frames.
///
/// Buffers raw bytes and yields the payload of each complete `data:` line
/// once its `\n\n` frame terminator has arrived. Decoding happens per
/// extracted frame, so a multi-byte character split across transport chunks
/// stays intact.
#[derive(Debug, Default)]
pub struct SseBuffer {
    buffer: Vec<u8>,
}

impl SseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes from the transport.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Pop the next complete `data:` payload, if a full frame is buffered.
    pub fn next_data(&mut self) -> Option<String> {
        while let Some(frame_end) = self.buffer.windows(2).position(|pair| pair == b"\n\n") {
            let frame: Vec<u8> = self.buffer.drain(..frame_end + 2).collect();
            let frame = String::from_utf8_lossy(&frame[..frame_end]);

            for line in frame.lines() {
                if let Some(payload) = line.strip_prefix("data:") {
                    return Some(payload.trim().to_string());
                }
            }
            // Frame without a data line (comments, event names): skip it.
        }
        None
    }
}
