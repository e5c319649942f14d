//! Infrastructure layer for tool-bridge
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer:
//!
//! - [`mcp`] — [`ToolGateway`](bridge_application::ToolGateway) over a stdio MCP server
//! - [`openai`] — [`LlmClient`](bridge_application::LlmClient) for chat completions
//! - [`logging`] — JSONL transcript [`ConversationLogger`](bridge_application::ConversationLogger)
//! - [`config`] — layered TOML and environment configuration

pub mod config;
pub mod logging;
pub mod mcp;
pub mod openai;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, FileBridgeConfig, FileConfig, FileLlmConfig, FileToolServerConfig,
};
pub use logging::JsonlConversationLogger;
pub use mcp::{McpError, McpServerConfig, McpToolGateway, ServerCommand};
pub use openai::{EndpointProfile, OpenAiClient, OpenAiSettings};
