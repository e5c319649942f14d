//! Presentation layer for tool-bridge
//!
//! This crate contains the CLI definition, the chat message handler and
//! the interactive console chat.

pub mod chat;
pub mod cli;

// Re-export commonly used types
pub use chat::{
    Channel, ChannelError, ChannelMember, ChatRepl, ConsoleChannel, HandlerFlow, MessageHandler,
};
pub use cli::commands::Cli;
