//! Tool server configuration from TOML (`[tool_server]` section)

use crate::mcp::{McpServerConfig, ServerCommand};
use bridge_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Raw tool server configuration from TOML
///
/// ```toml
/// [tool_server]
/// command = "node"
/// args = ["/opt/tools/server.js"]
/// request_timeout_secs = 60
///
/// [tool_server.env]
/// CONTENT_ROOT = "/srv/content"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolServerConfig {
    /// Program to launch
    pub command: String,
    pub args: Vec<String>,
    /// Extra environment for the child, on top of the inherited one
    pub env: BTreeMap<String, String>,
    /// Deadline per request, in seconds
    pub request_timeout_secs: u64,
    /// Client identity sent during the handshake
    pub client_name: String,
    pub client_version: String,
}

impl Default for FileToolServerConfig {
    fn default() -> Self {
        Self {
            command: "node".to_string(),
            args: Vec::new(),
            env: BTreeMap::new(),
            request_timeout_secs: 60,
            client_name: "tool-bridge".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl FileToolServerConfig {
    pub fn to_server_config(&self) -> McpServerConfig {
        let command = self
            .env
            .iter()
            .fold(
                ServerCommand::new(&self.command).with_args(self.args.iter().cloned()),
                |cmd, (k, v)| cmd.with_env(k, v),
            );
        McpServerConfig::new(command)
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_client_info(&self.client_name, &self.client_version)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.command.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyField {
                    field: "tool_server.command".to_string(),
                },
                "tool_server.command must not be empty",
            ));
        }
        if self.request_timeout_secs == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroLimit {
                    field: "tool_server.request_timeout_secs".to_string(),
                },
                "tool_server.request_timeout_secs is 0; every tool request will time out",
            ));
        }

        issues
    }
}
