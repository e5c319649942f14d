//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for tool-bridge
#[derive(Parser, Debug)]
#[command(name = "tool-bridge")]
#[command(author, version, about = "Chat with an LLM that can call tools on an MCP server")]
#[command(long_about = r#"
tool-bridge connects a chat model to the tools of an MCP server.

Each message is answered by letting the model call tools on the server
until it replies in plain text. Tool failures are handed back to the model;
the conversation starts fresh for every message.

Configuration files are loaded from (in priority order):
1. BRIDGE_* environment variables (e.g. BRIDGE_LLM__MODEL)
2. --config <path>         Explicit config file
3. ./tool-bridge.toml      Project-level config
4. ~/.config/tool-bridge/config.toml   Global config

Example:
  tool-bridge "Which pages mention the spring campaign?"
  tool-bridge -vv --config ./staging.toml
  MCP_SERVER_PATH=./server.js OPENAI_API_KEY=sk-... tool-bridge
"#)]
pub struct Cli {
    /// Question to answer once; starts interactive chat when omitted
    pub question: Option<String>,

    /// Override the configured model
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the typing spinner
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write diagnostics to a daily rolling file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Record conversation transcripts (JSONL) in this directory
    #[arg(long, value_name = "DIR")]
    pub transcript_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn question_is_optional() {
        let cli = Cli::parse_from(["tool-bridge"]);
        assert!(cli.question.is_none());
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["tool-bridge", "-vv", "--no-config", "list pages"]);
        assert_eq!(cli.question.as_deref(), Some("list pages"));
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_config);
    }

    #[test]
    fn paths_and_overrides() {
        let cli = Cli::parse_from([
            "tool-bridge",
            "--config",
            "bridge.toml",
            "--log-dir",
            "/tmp/logs",
            "--transcript-dir",
            "/tmp/transcripts",
            "-m",
            "gpt-4o-mini",
            "-q",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("bridge.toml")));
        assert_eq!(cli.log_dir, Some(PathBuf::from("/tmp/logs")));
        assert_eq!(cli.transcript_dir, Some(PathBuf::from("/tmp/transcripts")));
        assert_eq!(cli.model.as_deref(), Some("gpt-4o-mini"));
        assert!(cli.quiet);
    }
}
