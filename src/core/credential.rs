use std::fmt;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Reply used in place of a completion when no key was found.
pub const MISSING_CREDENTIAL_REPLY: &str =
    "OpenAI API key not found. Please set the OPENAI_API_KEY environment variable.";

/// The API secret, read once at startup. An unset or blank variable is
/// treated as missing.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    api_key: Option<String>,
}

impl Credential {
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(API_KEY_ENV).ok())
    }

    pub fn from_value(value: Option<String>) -> Self {
        let api_key = value.filter(|key| !key.trim().is_empty());
        Self { api_key }
    }

    pub fn missing() -> Self {
        Self { api_key: None }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.api_key.is_some()
    }

    /// One-line summary for the sidebar and `status` output.
    pub fn status_line(&self) -> &'static str {
        if self.is_present() {
            "✅ OpenAI API key loaded from environment variables"
        } else {
            "❌ OpenAI API key not found. Set the OPENAI_API_KEY environment variable."
        }
    }

    /// Setup hints shown when no key is configured.
    pub fn setup_hints() -> &'static [&'static str] {
        &[
            "Create a .env file in the working directory with:",
            "  OPENAI_API_KEY=your_api_key_here",
            "Or export it before starting:",
            "  export OPENAI_API_KEY=your_api_key_here",
        ]
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = if self.is_present() { "<redacted>" } else { "<missing>" };
        f.debug_struct("Credential").field("api_key", &shown).finish()
    }
}
