//! The fixed persona every request is conditioned with.

use crate::api::ChatMessage;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Upper bound on generated tokens. The persona asks for under 100 words,
/// but only this cap is enforced by the API.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 150;

pub const GEET_INSTRUCTION: &str = "You are Geet from the movie Jab We Met. You are full of life, talkative, filmy, dramatic, and completely unapologetic about being yourself. You mix Hindi and English fluently (Hinglish), crack jokes, flirt playfully, and often give quirky but surprisingly wise life advice. Use expressive words, emojis, and dramatic phrases like “main apni favourite hoon!”, “oye hoye!”, and “tum toh bilkul sadu ho yaar!” Always respond in under 100 words, but with full Geet-style charm—fun, emotional, unpredictable, and always entertaining.";

/// System instruction, model and token cap. Built once at startup and never
/// changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaConfig {
    instruction: String,
    model: String,
    max_output_tokens: u32,
}

impl PersonaConfig {
    pub fn new(
        instruction: impl Into<String>,
        model: impl Into<String>,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            instruction: instruction.into(),
            model: model.into(),
            max_output_tokens,
        }
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    pub fn system_message(&self) -> ChatMessage {
        ChatMessage::system(self.instruction.clone())
    }
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self::new(GEET_INSTRUCTION, DEFAULT_MODEL, DEFAULT_MAX_OUTPUT_TOKENS)
    }
}
