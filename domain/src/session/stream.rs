//! Streaming events for completion responses.
//!
//! [`StreamEvent`] represents individual events in a streaming completion,
//! bridging the transport layer to the application layer so answers can be
//! displayed as they are generated.

/// An event in a streaming completion response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk from the model.
    Delta(String),
    /// The stream ended normally.
    Done,
    /// An error that occurred mid-stream.
    Error(String),
}

impl StreamEvent {
    /// Returns the chunk text if this is a Delta event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done | StreamEvent::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_text_returns_content() {
        let event = StreamEvent::Delta("hello".to_string());
        assert_eq!(event.text(), Some("hello"));
        assert!(!event.is_terminal());
    }

    #[test]
    fn done_is_terminal() {
        assert!(StreamEvent::Done.is_terminal());
        assert_eq!(StreamEvent::Done.text(), None);
    }

    #[test]
    fn error_is_terminal() {
        let event = StreamEvent::Error("oops".to_string());
        assert!(event.is_terminal());
        assert_eq!(event.text(), None);
    }
}
