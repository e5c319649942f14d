//! REPL (Read-Eval-Print Loop) for interactive chat

use super::console::ConsoleChannel;
use super::handler::{ChannelMember, MessageHandler};
use bridge_application::ToolGateway;
use bridge_domain::ToolDescriptor;
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Member id the console uses for itself in membership events.
const BOT_ID: &str = "tool-bridge";

/// Member id for the person at the terminal.
const CONSOLE_USER_ID: &str = "console-user";

/// Slash commands understood by the REPL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Tools,
    Quit,
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line starting with `/`; anything else is not a command.
    pub fn parse(line: &str) -> Option<Self> {
        let cmd = line.trim();
        if !cmd.starts_with('/') {
            return None;
        }
        Some(match cmd {
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/tools" | "/t" => ReplCommand::Tools,
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            other => ReplCommand::Unknown(other.to_string()),
        })
    }
}

/// One line per tool: bold name, then the description if there is one.
pub fn format_tool_list(tools: &[ToolDescriptor]) -> String {
    if tools.is_empty() {
        return "  (the tool server advertises no tools)".dimmed().to_string();
    }
    tools
        .iter()
        .map(|tool| match tool.description.as_deref().filter(|d| !d.is_empty()) {
            Some(description) => format!("  {} - {}", tool.name.bold(), description),
            None => format!("  {}", tool.name.bold()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Interactive chat REPL
pub struct ChatRepl {
    handler: MessageHandler,
    channel: ConsoleChannel,
}

impl ChatRepl {
    pub fn new(handler: MessageHandler) -> Self {
        Self {
            handler,
            channel: ConsoleChannel::new(),
        }
    }

    /// Set whether to show the typing spinner
    pub fn with_progress(mut self, show: bool) -> Self {
        self.channel = ConsoleChannel::new().with_progress(show);
        self
    }

    pub fn handler(&self) -> &MessageHandler {
        &self.handler
    }

    /// Run the interactive REPL until `/quit` or end of input
    pub async fn run(&self) -> std::io::Result<()> {
        self.print_banner();
        self.handler
            .on_members_added(
                &[ChannelMember::new(CONSOLE_USER_ID)],
                BOT_ID,
                &self.channel,
            )
            .await;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("{} ", ">>>".green().bold());
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                println!();
                println!("Bye!");
                break;
            };
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            if let Some(command) = ReplCommand::parse(line) {
                if self.handle_command(command).await {
                    break;
                }
                continue;
            }

            println!();
            self.handler.on_message(line, &self.channel).await;
        }

        Ok(())
    }

    /// Answer a single question and return.
    pub async fn run_once(&self, question: &str) {
        self.handler.on_message(question, &self.channel).await;
    }

    fn print_banner(&self) {
        let use_case = self.handler.use_case();
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│            tool-bridge - Chat Mode          │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!(
            "Tool server: {}",
            if use_case.gateway().is_connected() {
                "connected".green()
            } else {
                "not connected (will retry on first message)".yellow()
            }
        );
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?    - Show this help");
        println!("  /tools, /t       - List the tools the model can call");
        println!("  /quit, /exit, /q - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                true
            }
            ReplCommand::Help => {
                println!();
                Self::print_help();
                false
            }
            ReplCommand::Tools => {
                self.print_tools().await;
                false
            }
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                false
            }
        }
    }

    async fn print_tools(&self) {
        let gateway = self.handler.use_case().gateway();
        if !gateway.is_connected() {
            if let Err(e) = gateway.connect().await {
                eprintln!("{} {}", "Error:".red().bold(), e);
                return;
            }
        }

        match gateway.list_tools().await {
            Ok(tools) => {
                println!();
                println!("{}", "Available tools:".cyan().bold());
                println!("{}", format_tool_list(&tools));
                println!();
            }
            Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(ReplCommand::parse("/help"), Some(ReplCommand::Help));
        assert_eq!(ReplCommand::parse(" /? "), Some(ReplCommand::Help));
        assert_eq!(ReplCommand::parse("/tools"), Some(ReplCommand::Tools));
        assert_eq!(ReplCommand::parse("/q"), Some(ReplCommand::Quit));
        assert_eq!(
            ReplCommand::parse("/frobnicate"),
            Some(ReplCommand::Unknown("/frobnicate".to_string()))
        );
        assert_eq!(ReplCommand::parse("list all pages"), None);
    }

    #[test]
    fn tool_list_shows_names_and_descriptions() {
        colored::control::set_override(false);

        let tools = vec![
            ToolDescriptor::new("search").with_description("Search content"),
            ToolDescriptor::new("ping"),
        ];
        assert_eq!(
            format_tool_list(&tools),
            "  search - Search content\n  ping"
        );
        assert!(format_tool_list(&[]).contains("no tools"));
    }
}
