//! Configuration file loading for tool-bridge
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `BRIDGE_*` environment variables
//! 2. Deployment variables (`OPENAI_API_KEY`, `OPENAI_ENDPOINT`, `OPENAI_MODEL`, `MCP_SERVER_PATH`)
//! 3. `--config <path>` specified file
//! 4. Project root: `./tool-bridge.toml` or `./.tool-bridge.toml`
//! 5. Global: `$XDG_CONFIG_HOME/tool-bridge/config.toml`
//! 6. Default values

mod file_config;
mod loader;

pub use file_config::{FileBridgeConfig, FileConfig, FileLlmConfig, FileToolServerConfig};
pub use loader::{ConfigError, ConfigLoader};
