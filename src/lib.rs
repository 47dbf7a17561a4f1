//! Matrix Chat is a terminal chat front-end for a remote language-model API.
//!
//! The crate is organized in a few small layers:
//! - [`core`] owns the session transcript, the fixed persona, credential
//!   lookup, configuration and the completion client.
//! - [`ui`] renders the full-screen interface and runs the event loop that
//!   drives a [`core::session::ChatSession`].
//! - [`api`] defines the `chat/completions` request and response payloads.
//! - [`cli`] parses arguments and dispatches to the interface or to the
//!   one-shot commands.
//!
//! The binary (`src/main.rs`) only calls [`cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
