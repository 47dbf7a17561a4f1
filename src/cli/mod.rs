//! Command-line interface parsing and dispatch.

pub mod say;
pub mod status;

use std::error::Error;

use clap::{Parser, Subcommand};

use crate::cli::say::run_say;
use crate::cli::status::print_status;
use crate::core::completion::CompletionClient;
use crate::core::config::Config;
use crate::core::credential::Credential;
use crate::core::persona::PersonaConfig;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::{init_tracing, LogTarget};

#[derive(Parser)]
#[command(name = "matrix-chat")]
#[command(about = "A terminal chat front-end with a fixed persona")]
#[command(
    long_about = "Matrix Chat is a full-screen terminal chat interface. Every message is sent, \
together with a fixed persona instruction, to an OpenAI-compatible completion API and the reply \
is shown in the transcript. Only the latest message is sent; the model does not see earlier turns.\n\n\
Environment Variables:\n\
  OPENAI_API_KEY    Your OpenAI API key (a .env file in the working directory is also read)\n\
  OPENAI_BASE_URL   Custom API base URL (optional, defaults to https://api.openai.com/v1)\n\
  MATRIX_CHAT_LOG   tracing filter for diagnostics written to stderr\n\n\
Controls:\n\
  Enter             Send the message\n\
  Up/Down/PgUp/PgDn Scroll through the transcript\n\
  Esc or Ctrl+C     Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send a single message and print the reply
    Say {
        /// Message text (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Show credential status and the effective settings
    Status,
}

/// Everything resolved once at process start.
pub struct Startup {
    pub config: Config,
    pub credential: Credential,
    pub base_url: String,
}

impl Startup {
    pub fn load() -> Result<Self, Box<dyn Error>> {
        // A missing .env file is normal.
        let _ = dotenvy::dotenv();
        let config = Config::load()?;
        let base_url = config.base_url_from_env();
        Ok(Self {
            config,
            credential: Credential::from_env(),
            base_url,
        })
    }

    pub fn client(&self) -> CompletionClient {
        CompletionClient::over_http(
            PersonaConfig::default(),
            self.credential.clone(),
            &self.base_url,
        )
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Commands::Chat);

    init_tracing(match command {
        Commands::Chat => LogTarget::FullScreen,
        Commands::Say { .. } | Commands::Status => LogTarget::Console,
    });

    let startup = Startup::load()?;
    match command {
        Commands::Chat => run_chat(startup.client(), startup.config.typing_delay()).await,
        Commands::Say { prompt } => run_say(&startup.client(), prompt).await,
        Commands::Status => {
            print_status(&startup);
            Ok(())
        }
    }
}
