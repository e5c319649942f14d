//! Chat module
//!
//! [`MessageHandler`] turns inbound messages into replies on any
//! [`Channel`]. [`ConsoleChannel`] and [`ChatRepl`] drive it from a terminal.

mod console;
mod handler;
mod repl;

pub use console::ConsoleChannel;
pub use handler::{
    Channel, ChannelError, ChannelMember, HandlerFlow, MessageHandler, error_reply,
};
pub use repl::{ChatRepl, ReplCommand, format_tool_list};
