//! WebSocket message types, serialization, and validation.

pub mod serializer;
pub mod types;
pub mod validator;

pub use serializer::{InboundError, decode_inbound, encode_outbound};
pub use types::{Envelope, InboundMessage, OutboundMessage, TypingPayload};
