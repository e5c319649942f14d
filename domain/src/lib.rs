//! Domain layer for tool-bridge
//!
//! This crate contains the conversation and tool types shared by every
//! other layer. It has no I/O and no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! - **Tool**: a named, schema-described operation owned by an external tool
//!   server ([`ToolDescriptor`], [`ToolCallRequest`], [`ToolOutput`])
//! - **Turn**: one entry in the history of a single run ([`ConversationTurn`])
//! - **Completion**: one LLM response, final text or tool calls ([`Completion`])

pub mod config;
pub mod prompt;
pub mod session;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use prompt::{DEFAULT_SYSTEM_PROMPT, DEFAULT_WELCOME_MESSAGE};
pub use session::{
    entities::{Conversation, ConversationTurn, Role},
    response::Completion,
};
pub use tool::{
    connection::ConnectionState,
    entities::{FunctionSchema, ParameterSchema, ToolCallKind, ToolCallRequest, ToolDescriptor},
    value_objects::{ToolCallResult, ToolContent, ToolOutput},
};
