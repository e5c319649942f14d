//! Tool domain value objects — raw tool output and the text handed back to the LLM

use serde::{Deserialize, Deserializer, Serialize};

/// A single content block in a tool server result.
///
/// Only `text` blocks carry meaning for the conversation; every other kind
/// is kept so callers can see what the server returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolContent {
    Text {
        text: String,
    },
    Image {
        #[serde(default)]
        data: String,
        #[serde(default, rename = "mimeType")]
        mime_type: String,
    },
    Audio {
        #[serde(default)]
        data: String,
        #[serde(default, rename = "mimeType")]
        mime_type: String,
    },
    Resource {
        #[serde(default)]
        resource: serde_json::Value,
    },
    #[serde(other)]
    Unknown,
}

impl ToolContent {
    pub fn text(text: impl Into<String>) -> Self {
        ToolContent::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolContent::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Raw result of a `tools/call` request, as returned by the tool server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Content blocks; `None` when the server sent no `content` field.
    /// A bare string is read as a single text block.
    #[serde(default, deserialize_with = "blocks_or_text")]
    pub content: Option<Vec<ToolContent>>,
    /// Server-side error flag. The content still describes the failure.
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawContent {
    Blocks(Vec<ToolContent>),
    Text(String),
}

fn blocks_or_text<'de, D>(deserializer: D) -> Result<Option<Vec<ToolContent>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<RawContent>::deserialize(deserializer)?.map(|raw| match raw {
            RawContent::Blocks(blocks) => blocks,
            RawContent::Text(text) => vec![ToolContent::Text { text }],
        }),
    )
}

impl ToolOutput {
    pub fn from_blocks(blocks: Vec<ToolContent>) -> Self {
        Self {
            content: Some(blocks),
            is_error: false,
        }
    }

    pub fn text_blocks(&self) -> impl Iterator<Item = &str> {
        self.content
            .iter()
            .flatten()
            .filter_map(ToolContent::as_text)
    }
}

/// Text result of one tool call, correlated with its request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub correlation_id: String,
    pub content: String,
}

impl ToolCallResult {
    pub fn new(correlation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            content: content.into(),
        }
    }

    /// Wrap a failure as data for the LLM.
    pub fn error(correlation_id: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::new(correlation_id, format!("Error executing tool: {}", cause))
    }
}
