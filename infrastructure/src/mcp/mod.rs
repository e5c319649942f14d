//! MCP tool server adapter
//!
//! Implements [`ToolGateway`](bridge_application::ToolGateway) over a child
//! process speaking newline-delimited JSON-RPC 2.0 on stdin/stdout.
//!
//! ```text
//! McpToolGateway ── state machine, generation counter
//!       │
//!       ▼
//! McpConnection ── reader / stderr / watcher tasks, pending-request table
//!       │
//!       ▼
//! child process (stdin ◄── requests, stdout ──► responses, stderr ──► tracing)
//! ```

pub mod connection;
pub mod error;
pub mod gateway;
pub mod protocol;
pub mod transport;

pub use connection::{McpConnection, ServerCommand};
pub use error::McpError;
pub use gateway::{McpServerConfig, McpToolGateway};
