//! Error types for the MCP tool server adapter

use std::time::Duration;
use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, McpError>;

/// Errors that can occur when communicating with the tool server process
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Failed to spawn tool server process: {0}")]
    SpawnError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("JSON-RPC error (code {code}): {message}")]
    RpcError { code: i64, message: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Transport closed")]
    TransportClosed,

    #[error("Request '{method}' timed out after {}s", timeout.as_secs_f32())]
    Timeout { method: String, timeout: Duration },
}
