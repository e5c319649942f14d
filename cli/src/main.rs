//! CLI entrypoint for tool-bridge
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use bridge_application::{ProcessMessageUseCase, ToolGateway};
use bridge_domain::ConfigIssue;
use bridge_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, McpToolGateway, OpenAiClient,
};
use bridge_presentation::{ChatRepl, Cli, MessageHandler};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Exit status after Ctrl-C.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let guard = init_tracing(cli.verbose, cli.log_dir.as_deref())?;

    info!("Starting tool-bridge {}", env!("CARGO_PKG_VERSION"));

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    check_config(&config)?;

    // === Dependency Injection ===
    let llm = Arc::new(OpenAiClient::new(config.llm.to_settings())?);
    info!(
        "LLM: {} via {}",
        config.llm.model,
        llm.profile().describe()
    );

    let gateway = Arc::new(McpToolGateway::new(config.tool_server.to_server_config()));

    let mut use_case = ProcessMessageUseCase::new(llm, gateway.clone())
        .with_system_prompt(&config.bridge.system_prompt)
        .with_params(config.bridge.to_execution_params());

    if let Some(dir) = &cli.transcript_dir {
        match JsonlConversationLogger::in_dir(dir) {
            Ok(logger) => {
                info!("Recording transcript to {}", logger.path().display());
                use_case = use_case.with_conversation_logger(Arc::new(logger));
            }
            Err(e) => warn!("Transcript disabled: {}: {}", dir.display(), e),
        }
    }

    let handler = MessageHandler::new(Arc::new(use_case))
        .with_welcome_message(&config.bridge.welcome_message);

    // A failed start is not fatal; the next message retries
    if let Err(e) = gateway.connect().await {
        warn!("{}; will retry when the next message arrives", e);
    }

    let repl = ChatRepl::new(handler).with_progress(!cli.quiet);

    let (outcome, interrupted) = tokio::select! {
        result = run(&repl, cli.question.as_deref()) => (result, false),
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            (Ok(()), true)
        }
    };

    repl.handler().shutdown().await;
    info!("Shut down");

    if interrupted {
        // Stdin may still be blocked in a read; flush logs and leave
        drop(guard);
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }
    outcome
}

async fn run(repl: &ChatRepl, question: Option<&str>) -> Result<()> {
    match question {
        Some(question) => repl.run_once(question).await,
        None => repl.run().await.context("chat input failed")?,
    }
    Ok(())
}

/// Stderr logging by verbosity, plus an optional daily rolling file.
///
/// Without `-v`, `RUST_LOG` is honoured when set.
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = if verbose == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "tool-bridge.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Log every issue; refuse to start on errors.
fn check_config(config: &FileConfig) -> Result<()> {
    let issues = config.validate();
    for issue in &issues {
        if issue.is_error() {
            error!("Config: {}", issue.message);
        } else {
            warn!("Config: {}", issue.message);
        }
    }

    let errors: Vec<&ConfigIssue> = issues.iter().filter(|i| i.is_error()).collect();
    if !errors.is_empty() {
        bail!(
            "Invalid configuration:\n{}",
            errors
                .iter()
                .map(|i| format!("  - {}", i.message))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
    Ok(())
}
