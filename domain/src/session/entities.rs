//! Conversation entities

use crate::tool::entities::ToolCallRequest;
use crate::tool::value_objects::ToolCallResult;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Role of a turn in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// One entry in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ConversationTurn {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolCallRequest>,
    },
    Tool {
        result: ToolCallResult,
    },
}

impl ConversationTurn {
    pub fn role(&self) -> Role {
        match self {
            ConversationTurn::System { .. } => Role::System,
            ConversationTurn::User { .. } => Role::User,
            ConversationTurn::Assistant { .. } => Role::Assistant,
            ConversationTurn::Tool { .. } => Role::Tool,
        }
    }

    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        match self {
            ConversationTurn::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    pub fn as_tool_result(&self) -> Option<&ToolCallResult> {
        match self {
            ConversationTurn::Tool { result } => Some(result),
            _ => None,
        }
    }
}

/// The append-only turn sequence threaded through one orchestration run.
///
/// Always starts with exactly one system turn and one user turn. Assistant
/// turns that request tools are only appended together with one tool turn
/// per call, so no call is ever left without a result.
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>, user_text: impl Into<String>) -> Self {
        Self {
            turns: vec![
                ConversationTurn::System {
                    content: system_prompt.into(),
                },
                ConversationTurn::User {
                    content: user_text.into(),
                },
            ],
        }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append one tool round: the assistant turn listing `answered` calls,
    /// then a tool turn with each call's result text, in order.
    ///
    /// A call whose id already appeared earlier in the round is left out of
    /// both, so every listed call has exactly one result.
    pub fn push_tool_round(
        &mut self,
        content: Option<String>,
        answered: Vec<(ToolCallRequest, String)>,
    ) {
        let mut seen = HashSet::new();
        let answered: Vec<_> = answered
            .into_iter()
            .filter(|(call, _)| seen.insert(call.id.clone()))
            .collect();

        self.turns.push(ConversationTurn::Assistant {
            content,
            tool_calls: answered.iter().map(|(call, _)| call.clone()).collect(),
        });
        self.turns
            .extend(answered.into_iter().map(|(call, text)| ConversationTurn::Tool {
                result: ToolCallResult::new(call.id, text),
            }));
    }
}
