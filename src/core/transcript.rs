//! In-memory, append-only chat transcript for one session.

use std::error::Error;
use std::fmt;

use crate::core::message::Message;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    /// A user entry had no visible content.
    EmptyUserMessage,
}

impl fmt::Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptError::EmptyUserMessage => write!(f, "user message must not be empty"),
        }
    }
}

impl Error for TranscriptError {}

/// Ordered list of messages. Entries are only ever appended; display order
/// is append order.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) -> Result<(), TranscriptError> {
        if message.is_user() && message.content().trim().is_empty() {
            return Err(TranscriptError::EmptyUserMessage);
        }
        self.messages.push(message);
        Ok(())
    }

    /// Records a reply. Assistant entries have no content rule, so this
    /// cannot fail.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
