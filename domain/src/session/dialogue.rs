//! Dialogue value object.

use super::message::Message;

/// The question/answer pair produced by one completed exchange cycle.
///
/// The pairing is ephemeral: both halves are persisted individually, the
/// dialogue itself never is.
#[derive(Debug, Clone)]
pub struct Dialogue {
    pub question: Message,
    pub answer: Message,
}

impl Dialogue {
    pub fn new(question: Message, answer: Message) -> Self {
        Self { question, answer }
    }
}
