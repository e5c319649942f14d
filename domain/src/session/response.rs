//! Completion returned by the LLM client.
//!
//! A completion either carries a final answer (text, no tool calls) or a set
//! of tool calls the orchestration loop must resolve before asking again.

use crate::tool::entities::ToolCallRequest;
use serde::{Deserialize, Serialize};

/// One completion from the LLM.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Assistant text, if any.
    pub text: Option<String>,
    /// Tool calls requested in this turn, in the order the model sent them.
    pub tool_calls: Vec<ToolCallRequest>,
    /// Model identifier reported by the API.
    pub model: Option<String>,
}

impl Completion {
    /// A text-only completion.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
            model: None,
        }
    }

    /// A completion that requests tool calls and carries no text.
    pub fn from_tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            text: None,
            tool_calls,
            model: None,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// The text, or `None` when it is absent or empty.
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_has_no_tool_calls() {
        let completion = Completion::from_text("Hello!");
        assert!(!completion.has_tool_calls());
        assert_eq!(completion.non_empty_text(), Some("Hello!"));
    }

    #[test]
    fn empty_text_is_treated_as_absent() {
        let completion = Completion::from_text("");
        assert_eq!(completion.non_empty_text(), None);
        assert_eq!(Completion::default().non_empty_text(), None);
    }

    #[test]
    fn from_tool_calls() {
        let completion =
            Completion::from_tool_calls(vec![ToolCallRequest::function("c1", "echo", "{}")]);
        assert!(completion.has_tool_calls());
        assert!(completion.text.is_none());
    }
}
