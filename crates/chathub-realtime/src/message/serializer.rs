//! JSON encoding and decoding of WebSocket frames.

use serde::Serialize;
use thiserror::Error;

use chathub_core::AppResult;

use super::types::{Envelope, InboundMessage, TypingPayload};
use super::validator::validate_inbound;

/// Reasons an inbound frame is dropped. None of them close the connection.
#[derive(Debug, Error)]
pub enum InboundError {
    /// Frame exceeds the configured size limit.
    #[error("frame of {size} bytes exceeds limit of {limit} bytes")]
    TooLarge {
        /// Actual size.
        size: usize,
        /// Configured limit.
        limit: usize,
    },
    /// Frame is empty or whitespace.
    #[error("empty frame")]
    Empty,
    /// Frame is not a `{type, data}` object.
    #[error("malformed envelope: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The `data` field does not match the shape required by `type`.
    #[error("malformed `{kind}` payload: {source}")]
    MalformedPayload {
        /// Message type tag.
        kind: String,
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// The `type` tag is not one the server handles.
    #[error("unknown message type `{0}`")]
    UnknownType(String),
}

/// Decodes a text frame into a typed inbound message.
///
/// Distinguishes an unknown `type` from a known type with a bad payload so the
/// two cases can be logged differently.
pub fn decode_inbound(raw: &str, max_bytes: usize) -> Result<InboundMessage, InboundError> {
    validate_inbound(raw, max_bytes)?;

    let envelope: Envelope = serde_json::from_str(raw).map_err(InboundError::Malformed)?;

    let typing = |data: serde_json::Value| {
        serde_json::from_value::<TypingPayload>(data).map_err(|source| {
            InboundError::MalformedPayload {
                kind: envelope.kind.clone(),
                source,
            }
        })
    };

    match envelope.kind.as_str() {
        "typing-start" => typing(envelope.data.clone()).map(InboundMessage::TypingStart),
        "typing-stop" => typing(envelope.data.clone()).map(InboundMessage::TypingStop),
        other => Err(InboundError::UnknownType(other.to_string())),
    }
}

/// Serializes an outbound message once so it can be fanned out as text.
pub fn encode_outbound<M: Serialize + ?Sized>(message: &M) -> AppResult<String> {
    Ok(serde_json::to_string(message)?)
}
