//! Inbound frame handling.

use tracing::{debug, warn};

use crate::connection::handle::ConnectionHandle;
use crate::message::serializer::{InboundError, decode_inbound};
use crate::message::types::{InboundMessage, OutboundMessage};

use super::Hub;

impl Hub {
    /// Processes a text frame received on `handle`.
    ///
    /// Unknown and malformed frames are logged and dropped; the connection
    /// stays up either way.
    pub async fn handle_inbound(&self, handle: &ConnectionHandle, raw: &str) {
        self.metrics.message_received();

        let message = match decode_inbound(raw, self.config.max_message_bytes) {
            Ok(message) => message,
            Err(InboundError::UnknownType(kind)) => {
                debug!(conn_id = %handle.id, kind = %kind, "Ignoring unknown message type");
                self.metrics.message_dropped();
                return;
            }
            Err(e) => {
                warn!(conn_id = %handle.id, error = %e, "Dropping malformed frame");
                self.metrics.message_dropped();
                return;
            }
        };

        match message {
            InboundMessage::TypingStart(payload) => {
                self.relay_typing(
                    handle,
                    &payload.conversation_id,
                    OutboundMessage::TypingStart {
                        conversation_id: payload.conversation_id.clone(),
                        user_id: handle.user_id.clone(),
                    },
                )
                .await;
            }
            InboundMessage::TypingStop(payload) => {
                self.relay_typing(
                    handle,
                    &payload.conversation_id,
                    OutboundMessage::TypingStop {
                        conversation_id: payload.conversation_id.clone(),
                        user_id: handle.user_id.clone(),
                    },
                )
                .await;
            }
        }
    }

    /// Forwards a typing event to the conversation's other participants.
    ///
    /// The sender must be a participant; the identity comes from the
    /// connection, never from the frame.
    async fn relay_typing(
        &self,
        handle: &ConnectionHandle,
        conversation_id: &str,
        event: OutboundMessage,
    ) {
        let participants = match self.directory.participants(conversation_id).await {
            Ok(participants) => participants,
            Err(e) => {
                debug!(
                    conn_id = %handle.id,
                    conversation_id = %conversation_id,
                    error = %e,
                    "Typing event dropped, participants unavailable"
                );
                return;
            }
        };

        if !participants.iter().any(|p| *p == handle.user_id) {
            warn!(
                user_id = %handle.user_id,
                conversation_id = %conversation_id,
                "Typing event from non-participant dropped"
            );
            return;
        }

        self.send_to_conversation_excluding_sender(&participants, &handle.user_id, &event);
    }
}
