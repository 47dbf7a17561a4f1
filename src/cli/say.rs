//! TUI-less "say" command

use std::error::Error;

use crate::core::completion::CompletionClient;
use crate::core::session::{ChatSession, SubmitOutcome};

pub async fn run_say(client: &CompletionClient, prompt: Vec<String>) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");

    let mut session = ChatSession::new();
    match session.submit(client, &prompt).await {
        SubmitOutcome::Answered(reply) => {
            println!("{reply}");
            Ok(())
        }
        SubmitOutcome::Ignored => {
            eprintln!("Usage: matrix-chat say <prompt>");
            std::process::exit(1);
        }
    }
}
