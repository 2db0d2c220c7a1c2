//! Wire frames for the assistant's `/rag/ws/ask` websocket.
//!
//! Every frame is a UTF-8 JSON text message. The client sends exactly one
//! shape, `{"query": "..."}`. The server tags its frames with a `type` field;
//! the session layer only acts on `final`, but the other known types are
//! decoded so they can be logged. Unknown types decode to
//! [`ServerEvent::Other`] instead of failing, so new server-side event kinds
//! never break an older client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error returned by [`decode_event`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text was not valid JSON, or a known field had the wrong shape.
    #[error("failed to decode json frame: {0}")]
    Json(#[from] serde_json::Error),
    /// The frame decoded to something other than a JSON object.
    #[error("frame is not a json object")]
    NotAnObject,
    /// The object carried no string `type` tag.
    #[error("frame has no `type` tag")]
    MissingType,
}

/// Outbound query frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFrame {
    pub query: String,
}

/// Terminal answer payload carried by a `final` frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FinalAnswer {
    /// Answer text. A `null` or missing answer decodes as empty.
    pub answer: String,
    /// Source URLs in server order. May be empty.
    pub sources: Vec<String>,
}

impl FinalAnswer {
    #[must_use]
    pub fn new(answer: impl Into<String>, sources: Vec<String>) -> Self {
        Self { answer: answer.into(), sources }
    }
}

/// A decoded inbound frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerEvent {
    /// `{"type":"final","answer":..,"sources":[..]}`: a completed answer.
    Final(FinalAnswer),
    /// `{"type":"stream","chunk":..}`: an incremental token chunk.
    Stream { chunk: String },
    /// `{"type":"stream_end","final":..}`: end of the token stream.
    StreamEnd { text: String },
    /// `{"type":"error","message":..}`: server-side failure for the last query.
    Error { message: String },
    /// Any other tag. Reserved by the server; carries the tag for logging.
    Other(String),
}

impl ServerEvent {
    /// The `type` tag this event was decoded from.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Final(_) => "final",
            Self::Stream { .. } => "stream",
            Self::StreamEnd { .. } => "stream_end",
            Self::Error { .. } => "error",
            Self::Other(tag) => tag,
        }
    }
}

/// Encode a query as the outbound JSON text frame.
#[must_use]
pub fn encode_query(query: &str) -> String {
    // A struct with one string field always serializes.
    serde_json::to_string(&QueryFrame { query: query.to_owned() }).unwrap_or_default()
}

/// Decode an inbound text frame.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed JSON or mistyped known fields,
/// [`CodecError::NotAnObject`] for non-object payloads and
/// [`CodecError::MissingType`] when the `type` tag is absent.
pub fn decode_event(text: &str) -> Result<ServerEvent, CodecError> {
    let value = serde_json::from_str::<Value>(text)?;
    if !value.is_object() {
        return Err(CodecError::NotAnObject);
    }

    let wire = serde_json::from_value::<WireEvent>(value)?;
    let Some(tag) = wire.kind else {
        return Err(CodecError::MissingType);
    };

    let event = match tag.as_str() {
        "final" => ServerEvent::Final(FinalAnswer {
            answer: wire.answer.unwrap_or_default(),
            sources: wire.sources.unwrap_or_default(),
        }),
        "stream" => ServerEvent::Stream { chunk: wire.chunk.unwrap_or_default() },
        "stream_end" => ServerEvent::StreamEnd { text: wire.final_text.unwrap_or_default() },
        "error" => ServerEvent::Error { message: wire.message.unwrap_or_default() },
        _ => ServerEvent::Other(tag),
    };

    Ok(event)
}

/// Loose view of every field a server frame may carry.
#[derive(Deserialize)]
struct WireEvent {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    sources: Option<Vec<String>>,
    #[serde(default)]
    chunk: Option<String>,
    #[serde(default, rename = "final")]
    final_text: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
