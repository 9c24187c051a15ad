//! Transport-neutral WebSocket frames.
//!
//! The read and write loops are generic over any `Stream`/`Sink` of
//! [`Frame`], so the same code drives an axum socket, a raw
//! `tokio-tungstenite` stream, or an in-memory channel in tests.

use thiserror::Error;
use tokio_tungstenite::tungstenite::Message;

/// A single WebSocket frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 data frame.
    Text(String),
    /// Binary data frame.
    Binary(Vec<u8>),
    /// Ping control frame.
    Ping(Vec<u8>),
    /// Pong control frame.
    Pong(Vec<u8>),
    /// Close control frame.
    Close,
}

/// Why a connection's loops stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectReason {
    /// The peer sent a close frame or ended the stream.
    #[error("peer closed the connection")]
    PeerClosed,
    /// Nothing was received within the read deadline.
    #[error("read deadline exceeded")]
    ReadTimeout,
    /// The transport reported a read error.
    #[error("read error: {0}")]
    ReadError(String),
    /// A write or flush did not finish within the write deadline.
    #[error("write deadline exceeded")]
    WriteTimeout,
    /// The transport reported a write error.
    #[error("write error: {0}")]
    WriteError(String),
    /// Teardown was requested by the hub (backpressure, replacement, shutdown).
    #[error("closed by hub")]
    Closed,
}

impl From<Message> for Frame {
    fn from(msg: Message) -> Self {
        match msg {
            Message::Text(text) => Self::Text(text.as_str().to_owned()),
            Message::Binary(data) => Self::Binary(data.to_vec()),
            Message::Ping(data) => Self::Ping(data.to_vec()),
            Message::Pong(data) => Self::Pong(data.to_vec()),
            Message::Close(_) => Self::Close,
            Message::Frame(frame) => Self::Binary(frame.payload().to_vec()),
        }
    }
}

impl From<Frame> for Message {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Text(text) => Message::Text(text.into()),
            Frame::Binary(data) => Message::Binary(data.into()),
            Frame::Ping(data) => Message::Ping(data.into()),
            Frame::Pong(data) => Message::Pong(data.into()),
            Frame::Close => Message::Close(None),
        }
    }
}
