//! Tool Gateway port
//!
//! Defines the interface to the external tool server. The gateway owns the
//! server process and its protocol session; the application layer only
//! discovers tools, invokes them, and observes the connection state.

use async_trait::async_trait;
use bridge_domain::{ConnectionState, ToolDescriptor, ToolOutput};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur during tool gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The server could not be started or the handshake failed.
    #[error("Tool server unavailable: {0}")]
    Unavailable(String),

    /// An operation was attempted while disconnected.
    #[error("Tool server not connected")]
    NotConnected,

    /// A single request failed (timeout, malformed response, crash mid-call).
    #[error("Tool invocation failed: {0}")]
    InvocationFailed(String),
}

impl GatewayError {
    pub fn is_not_connected(&self) -> bool {
        matches!(self, GatewayError::NotConnected)
    }
}

/// Gateway to the tool server
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ToolGateway: Send + Sync {
    /// Start the server and complete the handshake.
    ///
    /// A no-op when already connected.
    async fn connect(&self) -> Result<(), GatewayError>;

    /// List the tools the server currently advertises.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, GatewayError>;

    /// Invoke a tool and return its raw content blocks.
    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolOutput, GatewayError>;

    /// Close the session and terminate the server. Never fails.
    async fn disconnect(&self);

    /// Current connection state.
    fn state(&self) -> ConnectionState;

    fn is_connected(&self) -> bool {
        self.state().is_connected()
    }
}
