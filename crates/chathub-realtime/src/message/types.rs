//! Inbound and outbound WebSocket message type definitions.
//!
//! Every frame on the wire is a JSON object `{ "type": ..., "data": ... }`.

use serde::{Deserialize, Serialize};

use chathub_core::AppResult;

/// Untyped wire envelope.
///
/// Used to peek at the `type` tag before committing to a payload shape, and
/// by collaborators that push caller-defined events (session chat, canvas)
/// whose payload the hub does not interpret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message type tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Type-specific payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Envelope {
    /// Builds an envelope from any serializable payload.
    pub fn new(kind: impl Into<String>, data: impl Serialize) -> AppResult<Self> {
        Ok(Self {
            kind: kind.into(),
            data: serde_json::to_value(data)?,
        })
    }
}

/// Payload of a typing indicator sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingPayload {
    /// Conversation the user is typing in.
    pub conversation_id: String,
}

/// Messages sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum InboundMessage {
    /// The user started typing.
    TypingStart(TypingPayload),
    /// The user stopped typing.
    TypingStop(TypingPayload),
}

impl InboundMessage {
    /// Wire tag of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TypingStart(_) => "typing-start",
            Self::TypingStop(_) => "typing-stop",
        }
    }
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum OutboundMessage {
    /// A chat message was persisted.
    NewMessage(serde_json::Value),
    /// A participant read a message.
    MessageRead(serde_json::Value),
    /// A participant started typing.
    TypingStart {
        /// Conversation ID.
        conversation_id: String,
        /// Server-assigned identity of the typist.
        user_id: String,
    },
    /// A participant stopped typing.
    TypingStop {
        /// Conversation ID.
        conversation_id: String,
        /// Server-assigned identity of the typist.
        user_id: String,
    },
    /// A user opened a connection.
    UserOnline {
        /// User ID.
        user_id: String,
    },
    /// A user's last connection closed.
    UserOffline {
        /// User ID.
        user_id: String,
    },
}
