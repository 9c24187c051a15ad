//! WebSocket upgrade handler.

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::Response;
use futures::future;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info};

use chathub_core::error::AppError;
use chathub_realtime::connection::Frame;

use crate::auth::AuthenticatedUser;
use crate::dto::request::WsQuery;
use crate::error::ApiError;
use crate::extractors::bearer_token;
use crate::state::AppState;

/// GET /ws?token={jwt}
///
/// Authenticates before upgrading; the token may also come from an
/// `Authorization: Bearer` header.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let token = query
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_token(&headers))
        .ok_or_else(|| AppError::authentication("Missing access token"))?;

    let user = state.authenticator.authenticate(token).await?;
    debug!(user_id = %user.user_id, "WebSocket upgrade authorized");

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, user, socket)))
}

/// Hands an established socket to the real-time engine.
async fn handle_ws_connection(state: AppState, user: AuthenticatedUser, socket: WebSocket) {
    info!(user_id = %user.user_id, "WebSocket connection established");

    let (ws_tx, ws_rx) = socket.split();
    let stream = ws_rx.map(|result| result.map(frame_from_message));
    let sink = ws_tx.with(|frame: Frame| future::ready(Ok::<_, axum::Error>(message_from_frame(frame))));

    state.realtime.accept(user.user_id, stream, sink).await;
}

fn frame_from_message(message: Message) -> Frame {
    match message {
        Message::Text(text) => Frame::Text(text.as_str().to_owned()),
        Message::Binary(data) => Frame::Binary(data.to_vec()),
        Message::Ping(data) => Frame::Ping(data.to_vec()),
        Message::Pong(data) => Frame::Pong(data.to_vec()),
        Message::Close(_) => Frame::Close,
    }
}

fn message_from_frame(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text.into()),
        Frame::Binary(data) => Message::Binary(data.into()),
        Frame::Ping(data) => Message::Ping(data.into()),
        Frame::Pong(data) => Message::Pong(data.into()),
        Frame::Close => Message::Close(Some(CloseFrame {
            code: axum::extract::ws::close_code::NORMAL,
            reason: "".into(),
        })),
    }
}
