//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory under the platform config dir holding the global file.
const APP_DIR: &str = "tool-bridge";

/// Project-level file names, checked in order.
const PROJECT_FILES: [&str; 2] = ["tool-bridge.toml", ".tool-bridge.toml"];

/// Prefix for structured environment overrides (`BRIDGE_LLM__MODEL`).
const ENV_PREFIX: &str = "BRIDGE_";

/// Deployment variables mapped onto config keys.
const LEGACY_ENV: [(&str, &str); 3] = [
    ("OPENAI_API_KEY", "llm.api_key"),
    ("OPENAI_ENDPOINT", "llm.endpoint"),
    ("OPENAI_MODEL", "llm.model"),
];

/// Path to a Node.js tool server script; implies `command = "node"`.
const LEGACY_SERVER_PATH_ENV: &str = "MCP_SERVER_PATH";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `BRIDGE_*` environment variables (`__` separates sections)
    /// 2. `OPENAI_API_KEY`, `OPENAI_ENDPOINT`, `OPENAI_MODEL`, `MCP_SERVER_PATH`
    /// 3. Explicit config path (if provided)
    /// 4. Project root: `./tool-bridge.toml` or `./.tool-bridge.toml`
    /// 5. Global: `<config dir>/tool-bridge/config.toml`
    /// 6. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        if let Some(path) = config_path.filter(|p| !p.exists()) {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        Self::figment(config_path)
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// The merged provider chain, without extracting.
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path().filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        for (var, key) in LEGACY_ENV {
            figment = figment.merge(Env::raw().only(&[var]).map(move |_| key.into()));
        }
        if let Some(path) = std::env::var(LEGACY_SERVER_PATH_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
        {
            figment = figment
                .merge(Serialized::default("tool_server.command", "node"))
                .merge(Serialized::default("tool_server.args", vec![path]));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");

        println!("  [ENV  ] {}* (e.g. {}LLM__MODEL)", ENV_PREFIX, ENV_PREFIX);
        for (var, key) in LEGACY_ENV {
            let mark = if std::env::var_os(var).is_some() { "SET" } else { "   " };
            println!("  [{}  ] {} -> {}", mark, var, key);
        }
        let mark = if std::env::var_os(LEGACY_SERVER_PATH_ENV).is_some() {
            "SET"
        } else {
            "   "
        };
        println!("  [{}  ] {} -> tool_server.command/args", mark, LEGACY_SERVER_PATH_ENV);

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./tool-bridge.toml or ./.tool-bridge.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}
