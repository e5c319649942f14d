//! Shared helpers for the orchestration loop.

use bridge_domain::{FunctionSchema, ToolCallRequest, ToolDescriptor, ToolOutput};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::warn;

/// Text used when a tool succeeds without returning any text block.
pub const EMPTY_TOOL_OUTPUT: &str = "Operation completed successfully.";

/// Flatten a tool result into the text the LLM sees.
///
/// Text blocks are joined with a blank line; every other block kind is
/// dropped. Without any text the neutral [`EMPTY_TOOL_OUTPUT`] is returned.
pub fn extract_tool_text(output: &ToolOutput) -> String {
    let text = output.text_blocks().collect::<Vec<_>>().join("\n\n");
    if text.is_empty() {
        EMPTY_TOOL_OUTPUT.to_string()
    } else {
        text
    }
}

/// Translate descriptors into function schemas, dropping duplicate names.
///
/// The first descriptor with a given name wins so the LLM is never offered
/// two tools with the same name.
pub fn function_schemas(descriptors: &[ToolDescriptor]) -> Vec<FunctionSchema> {
    let mut seen = HashSet::new();
    descriptors
        .iter()
        .filter(|d| {
            let fresh = seen.insert(d.name.as_str());
            if !fresh {
                warn!("Tool server advertised '{}' more than once; ignoring duplicate", d.name);
            }
            fresh
        })
        .map(FunctionSchema::from_descriptor)
        .collect()
}

/// The calls of one completion with repeated correlation ids removed.
///
/// A result is matched to its call by id, so only the first call with a
/// given id is kept.
pub fn unique_calls(calls: &[ToolCallRequest]) -> Vec<&ToolCallRequest> {
    let mut seen = HashSet::new();
    calls
        .iter()
        .filter(|call| {
            let fresh = seen.insert(call.id.as_str());
            if !fresh {
                warn!(
                    "Model repeated tool call id '{}' ({}); not running it again",
                    call.id, call.tool_name
                );
            }
            fresh
        })
        .collect()
}

/// Extract a short preview string from tool call arguments.
///
/// Looks for well-known keys (`path`, `query`, `name`, `id`, `url`) first,
/// then falls back to the first string value found.
pub(crate) fn tool_args_preview(arguments: &Map<String, Value>) -> String {
    let keys = ["path", "query", "name", "id", "url"];
    for key in &keys {
        if let Some(Value::String(s)) = arguments.get(*key) {
            return truncate_preview(s, 50);
        }
    }
    arguments
        .values()
        .find_map(Value::as_str)
        .map(|s| truncate_preview(s, 50))
        .unwrap_or_default()
}

fn truncate_preview(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_domain::ToolContent;
    use serde_json::json;

    #[test]
    fn test_extract_joins_text_blocks_with_blank_line() {
        let output = ToolOutput::from_blocks(vec![
            ToolContent::text("a"),
            ToolContent::Image {
                data: "aGk=".to_string(),
                mime_type: "image/png".to_string(),
            },
            ToolContent::text("b"),
        ]);
        assert_eq!(extract_tool_text(&output), "a\n\nb");
    }

    #[test]
    fn test_extract_absent_content() {
        assert_eq!(extract_tool_text(&ToolOutput::default()), EMPTY_TOOL_OUTPUT);
    }

    #[test]
    fn test_extract_empty_content() {
        let output = ToolOutput::from_blocks(vec![]);
        assert_eq!(extract_tool_text(&output), "Operation completed successfully.");
    }

    #[test]
    fn test_extract_only_non_text_blocks() {
        let output = ToolOutput::from_blocks(vec![ToolContent::Unknown]);
        assert_eq!(extract_tool_text(&output), EMPTY_TOOL_OUTPUT);
    }

    #[test]
    fn test_function_schemas_drop_duplicates() {
        let descriptors = vec![
            ToolDescriptor::new("search").with_description("first"),
            ToolDescriptor::new("replace"),
            ToolDescriptor::new("search").with_description("second"),
        ];

        let schemas = function_schemas(&descriptors);
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas[0].name, "search");
        assert_eq!(schemas[0].description, "first");
        assert_eq!(schemas[1].name, "replace");
        assert_eq!(schemas[1].parameters["required"], json!([]));
    }

    #[test]
    fn test_args_preview_prefers_known_keys() {
        let args = json!({ "other": "ignored", "path": "/content/home" });
        assert_eq!(tool_args_preview(args.as_object().unwrap()), "/content/home");
    }

    #[test]
    fn test_args_preview_fallback_and_truncation() {
        let args = json!({ "count": 3, "needle": "x".repeat(80) });
        let preview = tool_args_preview(args.as_object().unwrap());
        assert_eq!(preview.chars().count(), 50);
        assert!(preview.ends_with('…'));

        let args = json!({ "count": 3 });
        assert_eq!(tool_args_preview(args.as_object().unwrap()), "");
    }

    #[test]
    fn test_unique_calls_keeps_first_of_each_id() {
        let calls = vec![
            ToolCallRequest::function("dup", "search", "{\"q\":1}"),
            ToolCallRequest::function("other", "search", "{}"),
            ToolCallRequest::function("dup", "delete", "{}"),
        ];
        let unique = unique_calls(&calls);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].tool_name, "search");
        assert_eq!(unique[0].arguments, "{\"q\":1}");
        assert_eq!(unique[1].id, "other");
    }
}
