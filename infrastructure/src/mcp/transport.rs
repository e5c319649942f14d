//! Transport layer for tool server communication.
//!
//! Framing is newline-delimited JSON: every message is one compact JSON
//! document followed by `\n`. `serde_json` escapes control characters inside
//! strings, so a serialized message never contains a raw newline.
//!
//! # Types
//!
//! - [`MessageKind`] — Classifies each incoming frame so the connection's
//!   reader task can dispatch it (response correlation, server request, or
//!   notification).
//! - [`classify_message`] — Pure function that inspects `id` / `method` fields.
//! - [`read_frame`] / [`write_frame`] — Line framing over any async reader
//!   or writer.

use crate::mcp::error::Result;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Classification of an incoming JSON-RPC message.
#[derive(Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// A response to a request we sent (no `method`).
    Response,
    /// A request from the server (has `id` + `method`), e.g. `ping`.
    IncomingRequest { id: Value },
    /// A notification (has `method`, no `id`).
    Notification,
}

/// Classify a JSON-RPC message by inspecting `id` and `method` fields.
pub fn classify_message(json: &Value) -> MessageKind {
    let id = json.get("id").filter(|v| !v.is_null());
    let has_method = json.get("method").and_then(|v| v.as_str()).is_some();

    match (id, has_method) {
        (Some(id), true) => MessageKind::IncomingRequest { id: id.clone() },
        (None, true) => MessageKind::Notification,
        (_, false) => MessageKind::Response,
    }
}

/// Read the next non-blank line into `line`.
///
/// Returns `Ok(false)` at end of stream.
pub async fn read_frame<R>(reader: &mut R, line: &mut String) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        line.clear();
        let bytes_read = reader.read_line(line).await?;
        if bytes_read == 0 {
            return Ok(false);
        }
        if !line.trim().is_empty() {
            return Ok(true);
        }
    }
}

/// Serialize `message` as one line and flush it.
pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut frame = serde_json::to_vec(message)?;
    frame.push(b'\n');
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}
