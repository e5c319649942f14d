//! Raw TOML configuration data types
//!
//! These structs mirror the config file one-to-one. Every field has a
//! default, so an empty file (or no file) is a valid configuration.

mod bridge;
mod llm;
mod tool_server;

pub use bridge::FileBridgeConfig;
pub use llm::FileLlmConfig;
pub use tool_server::FileToolServerConfig;

use bridge_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Completions endpoint
    pub llm: FileLlmConfig,
    /// Tool server process
    pub tool_server: FileToolServerConfig,
    /// Prompts and loop limits
    pub bridge: FileBridgeConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.llm.validate();
        issues.extend(self.tool_server.validate());
        issues.extend(self.bridge.validate());
        issues
    }
}
