//! MCP tool gateway implementation

use crate::mcp::connection::{McpConnection, ServerCommand};
use crate::mcp::error::{McpError, Result};
use crate::mcp::protocol::{
    CallToolParams, Implementation, InitializeParams, InitializeResult, ListToolsParams,
    ListToolsResult, PROTOCOL_VERSION,
};
use async_trait::async_trait;
use bridge_application::ports::tool_gateway::{GatewayError, ToolGateway};
use bridge_domain::{ConnectionState, ToolDescriptor, ToolOutput};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Settings for launching and talking to the tool server.
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    pub command: ServerCommand,
    /// Deadline for each individual request.
    pub request_timeout: Duration,
    /// Identity announced in `initialize`.
    pub client_info: Implementation,
}

impl McpServerConfig {
    pub fn new(command: ServerCommand) -> Self {
        Self {
            command,
            request_timeout: Duration::from_secs(60),
            client_info: Implementation {
                name: "tool-bridge".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_client_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.client_info = Implementation {
            name: name.into(),
            version: version.into(),
        };
        self
    }
}

/// Connection state shared with the exit watcher.
///
/// `generation` changes on every connect attempt and every disconnect; an
/// exit callback only applies when its generation is still current.
struct GatewayInner {
    state: ConnectionState,
    generation: u64,
    connection: Option<Arc<McpConnection>>,
}

/// Tool gateway backed by a stdio MCP server process
pub struct McpToolGateway {
    config: McpServerConfig,
    inner: Arc<std::sync::Mutex<GatewayInner>>,
    /// Serializes connect attempts so concurrent callers spawn at most once.
    connect_lock: tokio::sync::Mutex<()>,
}

impl McpToolGateway {
    pub fn new(config: McpServerConfig) -> Self {
        Self {
            config,
            inner: Arc::new(std::sync::Mutex::new(GatewayInner {
                state: ConnectionState::Disconnected,
                generation: 0,
                connection: None,
            })),
            connect_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &McpServerConfig {
        &self.config
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, GatewayInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The current connection, or `NotConnected` without touching the pipes.
    fn live_connection(&self) -> std::result::Result<Arc<McpConnection>, GatewayError> {
        let inner = self.lock_inner();
        match (&inner.state, &inner.connection) {
            (ConnectionState::Connected, Some(connection)) if !connection.is_closed() => {
                Ok(Arc::clone(connection))
            }
            _ => Err(GatewayError::NotConnected),
        }
    }

    /// Spawn the process and run the handshake.
    async fn open(&self, generation: u64) -> Result<Arc<McpConnection>> {
        let inner = Arc::clone(&self.inner);
        let connection = McpConnection::spawn(
            &self.config.command,
            self.config.request_timeout,
            move |status| {
                let mut inner = inner.lock().unwrap_or_else(|e| e.into_inner());
                if inner.generation == generation
                    && inner.state != ConnectionState::Disconnected
                {
                    warn!(
                        "Tool server exited unexpectedly ({}); marking disconnected",
                        status
                            .map(|s| s.to_string())
                            .unwrap_or_else(|| "unknown status".into())
                    );
                    inner.state = ConnectionState::Disconnected;
                    inner.connection = None;
                }
            },
        )?;
        let connection = Arc::new(connection);

        if let Err(e) = self.handshake(&connection).await {
            connection.shutdown().await;
            return Err(e);
        }

        Ok(connection)
    }

    /// `initialize` request followed by the `notifications/initialized`
    /// notification.
    async fn handshake(&self, connection: &McpConnection) -> Result<()> {
        let params = serde_json::to_value(InitializeParams::new(self.config.client_info.clone()))?;
        let result: InitializeResult = connection.request_as("initialize", Some(params)).await?;

        if result.protocol_version != PROTOCOL_VERSION {
            debug!(
                "Tool server negotiated protocol {} (requested {})",
                result.protocol_version, PROTOCOL_VERSION
            );
        }
        if let Some(server) = &result.server_info {
            info!("Connected to tool server {} {}", server.name, server.version);
        }

        connection.notify("notifications/initialized", None).await
    }
}

fn invocation_failed(e: McpError) -> GatewayError {
    GatewayError::InvocationFailed(e.to_string())
}

#[async_trait]
impl ToolGateway for McpToolGateway {
    async fn connect(&self) -> std::result::Result<(), GatewayError> {
        let _guard = self.connect_lock.lock().await;

        let (generation, stale) = {
            let mut inner = self.lock_inner();
            if inner.state == ConnectionState::Connected {
                if inner.connection.as_ref().is_some_and(|c| !c.is_closed()) {
                    debug!("Tool gateway already connected");
                    return Ok(());
                }
                warn!("Tool server connection was closed; reconnecting");
            }
            inner.state = ConnectionState::Connecting;
            inner.generation += 1;
            (inner.generation, inner.connection.take())
        };

        if let Some(stale) = stale {
            stale.shutdown().await;
        }

        info!("Starting tool server: {}", self.config.command.display());

        match self.open(generation).await {
            Ok(connection) => {
                let current = {
                    let mut inner = self.lock_inner();
                    let current = inner.generation == generation && !connection.is_closed();
                    if current {
                        inner.state = ConnectionState::Connected;
                        inner.connection = Some(Arc::clone(&connection));
                    }
                    current
                };

                // Disconnected or exited while the handshake was running
                if !current {
                    connection.shutdown().await;
                    let mut inner = self.lock_inner();
                    if inner.generation == generation {
                        inner.state = ConnectionState::Disconnected;
                    }
                    return Err(GatewayError::Unavailable(
                        "connection closed during handshake".to_string(),
                    ));
                }
            }
            Err(e) => {
                warn!("Failed to connect to tool server: {}", e);
                let mut inner = self.lock_inner();
                if inner.generation == generation {
                    inner.state = ConnectionState::Disconnected;
                    inner.connection = None;
                }
                return Err(GatewayError::Unavailable(e.to_string()));
            }
        }

        info!("Tool gateway connected");

        // Diagnostic only
        match self.list_tools().await {
            Ok(tools) => info!(
                "Available tools: {}",
                tools
                    .iter()
                    .map(|t| t.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Err(e) => warn!("Failed to list tools after connect: {}", e),
        }

        Ok(())
    }

    async fn list_tools(&self) -> std::result::Result<Vec<ToolDescriptor>, GatewayError> {
        let connection = self.live_connection()?;

        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen_cursors = HashSet::new();

        loop {
            let params = serde_json::to_value(ListToolsParams {
                cursor: cursor.take(),
            })
            .map_err(|e| invocation_failed(e.into()))?;

            let page: ListToolsResult = connection
                .request_as("tools/list", Some(params))
                .await
                .map_err(invocation_failed)?;
            tools.extend(page.tools);

            match page.next_cursor.filter(|c| !c.is_empty()) {
                Some(next) if seen_cursors.insert(next.clone()) => cursor = Some(next),
                Some(next) => {
                    warn!("Tool server repeated list cursor '{}'; stopping", next);
                    break;
                }
                None => break,
            }
        }

        debug!("Tool server advertises {} tools", tools.len());
        Ok(tools)
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> std::result::Result<ToolOutput, GatewayError> {
        let connection = self.live_connection()?;

        debug!("tools/call {}", name);
        let params = serde_json::to_value(CallToolParams { name, arguments })
            .map_err(|e| invocation_failed(e.into()))?;

        let output: ToolOutput = connection
            .request_as("tools/call", Some(params))
            .await
            .map_err(|e| {
                warn!("Tool '{}' failed: {}", name, e);
                invocation_failed(e)
            })?;

        debug!(
            "Tool '{}' returned {} blocks (is_error={})",
            name,
            output.content.as_ref().map(Vec::len).unwrap_or(0),
            output.is_error
        );
        Ok(output)
    }

    async fn disconnect(&self) {
        let connection = {
            let mut inner = self.lock_inner();
            let was_connected = inner.state != ConnectionState::Disconnected;
            inner.generation += 1;
            inner.state = ConnectionState::Disconnected;
            let connection = inner.connection.take();
            if !was_connected && connection.is_none() {
                return;
            }
            connection
        };

        if let Some(connection) = connection {
            connection.shutdown().await;
        }
        info!("Tool gateway disconnected");
    }

    /// A connection whose channel has closed reads as `Disconnected` even
    /// before the exit watcher has caught up.
    fn state(&self) -> ConnectionState {
        let inner = self.lock_inner();
        match (inner.state, &inner.connection) {
            (ConnectionState::Connected, Some(connection)) if connection.is_closed() => {
                ConnectionState::Disconnected
            }
            (state, _) => state,
        }
    }
}
