pub mod completion;
pub mod config;
pub mod credential;
pub mod message;
pub mod persona;
pub mod session;
pub mod transcript;
