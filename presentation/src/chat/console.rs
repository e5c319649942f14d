//! Terminal implementation of [`Channel`].

use super::handler::{Channel, ChannelError};
use async_trait::async_trait;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

/// Prints replies to stdout; the typing indicator is a spinner.
pub struct ConsoleChannel {
    show_progress: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleChannel {
    pub fn new() -> Self {
        Self {
            show_progress: true,
            spinner: Mutex::new(None),
        }
    }

    /// Set whether to show the typing spinner
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn clear_spinner(&self) {
        if let Some(pb) = self.spinner.lock().ok().and_then(|mut s| s.take()) {
            pb.finish_and_clear();
        }
    }
}

impl Default for ConsoleChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Channel for ConsoleChannel {
    async fn send_typing(&self) -> Result<(), ChannelError> {
        if !self.show_progress {
            return Ok(());
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_message("Thinking...".dimmed().to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        let mut spinner = self
            .spinner
            .lock()
            .map_err(|_| ChannelError("spinner lock poisoned".to_string()))?;
        if let Some(previous) = spinner.replace(pb) {
            previous.finish_and_clear();
        }
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<(), ChannelError> {
        self.clear_spinner();

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}\n{}\n", "Assistant:".cyan().bold(), text)
            .and_then(|_| stdout.flush())
            .map_err(|e| ChannelError(e.to_string()))
    }
}

impl Drop for ConsoleChannel {
    fn drop(&mut self) {
        self.clear_spinner();
    }
}
