//! Application layer for tool-bridge
//!
//! This crate contains the orchestration loop, the ports it depends on and
//! its execution parameters. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_client::{LlmClient, LlmError},
    tool_gateway::{GatewayError, ToolGateway},
};
pub use use_cases::process_message::{
    BudgetLimit, FALLBACK_ANSWER, ProcessMessageError, ProcessMessageUseCase,
};
pub use use_cases::tool_helpers::{EMPTY_TOOL_OUTPUT, extract_tool_text, function_schemas};
