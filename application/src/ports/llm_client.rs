//! LLM Client port
//!
//! Defines the single stateless completion request the orchestration loop
//! depends on. The concrete wire protocol is an infrastructure concern.

use async_trait::async_trait;
use bridge_domain::{Completion, ConversationTurn, FunctionSchema};
use thiserror::Error;

/// Errors that can occur during a completion request
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Rate limited (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } | LlmError::Network(_) => true,
            LlmError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Client for LLM completions
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Request one completion for the full turn history.
    ///
    /// `tools` are offered with automatic tool choice: the model decides
    /// whether to answer or to call tools.
    async fn complete(
        &self,
        turns: &[ConversationTurn],
        tools: &[FunctionSchema],
    ) -> Result<Completion, LlmError>;

    /// Model identifier used for requests.
    fn model(&self) -> &str;
}
