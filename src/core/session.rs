use tracing::debug;

use crate::core::completion::CompletionClient;
use crate::core::message::Message;
use crate::core::transcript::{Transcript, TranscriptError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input was blank; nothing was recorded or sent.
    Ignored,
    /// A user entry and its reply were appended.
    Answered(String),
}

/// One interactive chat session. Owns its transcript; created when the
/// session starts and dropped when it ends.
#[derive(Debug, Default)]
pub struct ChatSession {
    transcript: Transcript,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Records `input`, asks `client` for a reply and records that too.
    /// Blank input is dropped before anything is sent.
    pub async fn submit(&mut self, client: &CompletionClient, input: &str) -> SubmitOutcome {
        match self.transcript.append(Message::user(input)) {
            Ok(()) => {}
            Err(TranscriptError::EmptyUserMessage) => {
                debug!("ignoring blank input");
                return SubmitOutcome::Ignored;
            }
        }

        let reply = client.complete(input).await;
        self.transcript.push_assistant(reply.clone());
        debug!(entries = self.transcript.len(), "turn recorded");
        SubmitOutcome::Answered(reply)
    }
}
