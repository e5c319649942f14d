//! Wire types for the chat completions API and their mapping to domain types.

use bridge_domain::{Completion, ConversationTurn, FunctionSchema, ToolCallKind, ToolCallRequest};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct ApiRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ApiToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<&'static str>,
}

impl<'a> ApiRequest<'a> {
    /// Build a request; tools (and tool choice) are omitted when empty.
    pub fn new(model: &'a str, turns: &[ConversationTurn], tools: &[FunctionSchema]) -> Self {
        let has_tools = !tools.is_empty();
        Self {
            model,
            messages: to_api_messages(turns),
            tools: has_tools.then(|| to_api_tools(tools)),
            tool_choice: has_tools.then_some("auto"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ApiMessage {
    pub role: String,
    /// Serialized as `null` for assistant turns that only carry tool calls.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ApiToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    #[serde(default)]
    pub function: Option<ApiFunction>,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ApiFunction {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiToolDefinition {
    pub r#type: &'static str,
    pub function: ApiToolFunction,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiToolFunction {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiChoice {
    pub message: ApiMessage,
}

impl ApiResponse {
    /// The first choice as a [`Completion`], or `None` without choices.
    pub fn into_completion(self) -> Option<Completion> {
        let choice = self.choices.into_iter().next()?;
        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| {
                let (tool_name, arguments) = tc
                    .function
                    .map(|f| (f.name, f.arguments))
                    .unwrap_or_default();
                ToolCallRequest {
                    id: tc.id,
                    kind: ToolCallKind::parse(&tc.kind),
                    tool_name,
                    arguments,
                }
            })
            .collect();

        Some(Completion {
            text: choice.message.content,
            tool_calls,
            model: self.model,
        })
    }
}

/// Convert conversation turns to API messages.
pub(crate) fn to_api_messages(turns: &[ConversationTurn]) -> Vec<ApiMessage> {
    turns
        .iter()
        .map(|turn| match turn {
            ConversationTurn::System { content } => ApiMessage {
                role: "system".into(),
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: None,
            },
            ConversationTurn::User { content } => ApiMessage {
                role: "user".into(),
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: None,
            },
            ConversationTurn::Assistant {
                content,
                tool_calls,
            } => ApiMessage {
                role: "assistant".into(),
                content: content.clone(),
                tool_calls: if tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        tool_calls
                            .iter()
                            .map(|tc| ApiToolCall {
                                id: tc.id.clone(),
                                kind: tc.kind.as_str().to_string(),
                                function: Some(ApiFunction {
                                    name: tc.tool_name.clone(),
                                    arguments: tc.arguments.clone(),
                                }),
                            })
                            .collect(),
                    )
                },
                tool_call_id: None,
            },
            ConversationTurn::Tool { result } => ApiMessage {
                role: "tool".into(),
                content: Some(result.content.clone()),
                tool_calls: None,
                tool_call_id: Some(result.correlation_id.clone()),
            },
        })
        .collect()
}

/// Convert function schemas to API tool definitions.
pub(crate) fn to_api_tools(tools: &[FunctionSchema]) -> Vec<ApiToolDefinition> {
    tools
        .iter()
        .map(|t| ApiToolDefinition {
            r#type: "function",
            function: ApiToolFunction {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.clone(),
            },
        })
        .collect()
}
