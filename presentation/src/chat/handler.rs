//! Inbound message handling for a chat channel.
//!
//! [`MessageHandler`] sits between a chat platform and the
//! [`ProcessMessageUseCase`]. It owns the user-facing policy: a typing
//! indicator while working, a lazy reconnect to the tool server, and a
//! formatted reply when anything fails. The conversation itself never
//! outlives one message.

use async_trait::async_trait;
use bridge_application::{ProcessMessageUseCase, ToolGateway};
use bridge_domain::DEFAULT_WELCOME_MESSAGE;
use bridge_domain::util::log_preview;
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
#[error("Failed to deliver message: {0}")]
pub struct ChannelError(pub String);

/// Outbound side of a chat platform.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Signal that a reply is being prepared.
    async fn send_typing(&self) -> Result<(), ChannelError>;

    async fn send_text(&self, text: &str) -> Result<(), ChannelError>;
}

/// A participant reported by a membership event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMember {
    pub id: String,
    pub name: Option<String>,
}

impl ChannelMember {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

/// What the platform should do after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerFlow {
    /// Pass the activity on to the next handler.
    Continue,
}

/// Reply sent when a message could not be processed.
pub fn error_reply(cause: &dyn Display) -> String {
    format!(
        "❌ **Error Processing Request**\n\n{}\n\nPlease try again or contact support if the issue persists.",
        cause
    )
}

pub struct MessageHandler {
    use_case: Arc<ProcessMessageUseCase>,
    welcome_message: String,
}

impl MessageHandler {
    pub fn new(use_case: Arc<ProcessMessageUseCase>) -> Self {
        Self {
            use_case,
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
        }
    }

    pub fn with_welcome_message(mut self, message: impl Into<String>) -> Self {
        self.welcome_message = message.into();
        self
    }

    pub fn use_case(&self) -> &Arc<ProcessMessageUseCase> {
        &self.use_case
    }

    /// Answer one user message on `channel`.
    ///
    /// Every failure, including a failed reconnect, becomes an error reply;
    /// the handler itself never fails.
    pub async fn on_message(&self, text: &str, channel: &dyn Channel) -> HandlerFlow {
        info!("Received message: {}", log_preview(text, 100));

        if let Err(e) = channel.send_typing().await {
            debug!("Typing indicator not delivered: {}", e);
        }

        let reply = match self.answer(text).await {
            Ok(answer) => answer,
            Err(cause) => {
                error!("Error processing message: {}", cause);
                error_reply(&cause)
            }
        };

        match channel.send_text(&reply).await {
            Ok(()) => debug!("Reply sent ({} bytes)", reply.len()),
            Err(e) => warn!("{}", e),
        }

        HandlerFlow::Continue
    }

    async fn answer(&self, text: &str) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let gateway = self.use_case.gateway();
        if !gateway.is_connected() {
            info!("Tool server not connected; reconnecting");
            gateway.connect().await?;
        }
        Ok(self.use_case.execute(text).await?)
    }

    /// Greet every new member except the bot itself.
    pub async fn on_members_added(
        &self,
        members: &[ChannelMember],
        recipient_id: &str,
        channel: &dyn Channel,
    ) -> HandlerFlow {
        for member in members.iter().filter(|m| m.id != recipient_id) {
            debug!("Welcoming member {}", member.id);
            if let Err(e) = channel.send_text(&self.welcome_message).await {
                warn!("{}", e);
            }
        }
        HandlerFlow::Continue
    }

    /// Tear down the tool server connection.
    pub async fn shutdown(&self) {
        self.use_case.gateway().disconnect().await;
    }
}
