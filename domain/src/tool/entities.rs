//! Tool domain entities

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque parameter schema reported by the tool server.
///
/// The tree is passed through untouched; only the `properties` and
/// `required` members are projected out when building a [`FunctionSchema`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSchema(pub Value);

impl ParameterSchema {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The `properties` object, or an empty object when absent or malformed.
    pub fn properties(&self) -> Map<String, Value> {
        self.0
            .get("properties")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    /// The `required` list, or an empty list when absent or malformed.
    pub fn required(&self) -> Vec<Value> {
        self.0
            .get("required")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// A tool advertised by the tool server.
///
/// Field names follow the wire shape of `tools/list` so descriptors can be
/// deserialized straight from the server response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique, stable identifier of the tool
    pub name: String,
    /// Human-readable description (servers may omit it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parameter schema (JSON-Schema-like tree)
    #[serde(default)]
    pub input_schema: ParameterSchema,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: ParameterSchema::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = ParameterSchema::new(schema);
        self
    }
}

/// Function definition offered to the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    /// Always an object schema with `properties` and `required` present.
    pub parameters: Value,
}

impl FunctionSchema {
    /// Translate a descriptor into the LLM-facing function shape.
    ///
    /// A missing description becomes an empty string; missing `properties`
    /// or `required` become an empty object and an empty list.
    pub fn from_descriptor(descriptor: &ToolDescriptor) -> Self {
        let parameters = serde_json::json!({
            "type": "object",
            "properties": descriptor.input_schema.properties(),
            "required": descriptor.input_schema.required(),
        });

        Self {
            name: descriptor.name.clone(),
            description: descriptor.description.clone().unwrap_or_default(),
            parameters,
        }
    }
}

/// Kind of a tool call requested by the LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolCallKind {
    /// A function invocation — the only kind the bridge executes.
    Function,
    /// Any kind this version does not understand.
    Other(String),
}

impl ToolCallKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "function" => ToolCallKind::Function,
            other => ToolCallKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ToolCallKind::Function => "function",
            ToolCallKind::Other(s) => s,
        }
    }
}

impl std::fmt::Display for ToolCallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tool invocation requested by the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Correlation id assigned by the LLM; echoed back in the result.
    pub id: String,
    pub kind: ToolCallKind,
    pub tool_name: String,
    /// Arguments in their transport encoding (a JSON object as text).
    pub arguments: String,
}

impl ToolCallRequest {
    pub fn function(
        id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ToolCallKind::Function,
            tool_name: tool_name.into(),
            arguments: arguments.into(),
        }
    }

    pub fn is_function(&self) -> bool {
        self.kind == ToolCallKind::Function
    }

    /// Decode the arguments into a parameter map.
    ///
    /// Blank argument text decodes to an empty map; anything that is not a
    /// JSON object is an error.
    pub fn parse_arguments(&self) -> Result<Map<String, Value>, serde_json::Error> {
        if self.arguments.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&self.arguments)
    }
}
