//! Tool domain module
//!
//! Tools are owned by an external tool server. The bridge only sees them
//! through the types in this module:
//!
//! ```text
//! ┌────────────────┐   ┌─────────────────┐   ┌────────────┐   ┌────────────────┐
//! │ ToolDescriptor │──▶│ FunctionSchema  │   │ ToolOutput │──▶│ ToolCallResult │
//! │ (tools/list)   │   │ (offered to LLM)│   │(tools/call)│   │ (text for LLM) │
//! └────────────────┘   └─────────────────┘   └────────────┘   └────────────────┘
//!                             │                    ▲
//!                             ▼                    │
//!                      ToolCallRequest ────────────┘
//! ```
//!
//! - [`ToolDescriptor`] — name, description and opaque [`ParameterSchema`]
//! - [`FunctionSchema`] — the function definition the LLM is offered
//! - [`ToolCallRequest`] — a call requested by the LLM, arguments still encoded
//! - [`ToolOutput`] — raw content blocks returned by the server
//! - [`ToolCallResult`] — plain text correlated with the request id
//! - [`ConnectionState`] — lifecycle of the server connection

pub mod connection;
pub mod entities;
pub mod value_objects;

pub use connection::ConnectionState;
pub use entities::{FunctionSchema, ParameterSchema, ToolCallKind, ToolCallRequest, ToolDescriptor};
pub use value_objects::{ToolCallResult, ToolContent, ToolOutput};
