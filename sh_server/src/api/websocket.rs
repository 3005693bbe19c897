//! WebSocket handler for the game protocol.
//!
//! Each client holds one WebSocket for its whole session. Frames are JSON
//! objects tagged by `type`; see [`shedding::messages`] for both directions.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws`
//! 2. Server assigns a connection id and registers an outbox with the
//!    session actor
//! 3. Server spawns a send task that writes everything from the outbox
//!    (room broadcasts and direct replies) to the socket
//! 4. The receive loop rate-limits, decodes, and forwards client frames to
//!    the session actor
//! 5. On disconnect the session actor removes the player from their room
//! 6. If the session actor drops the outbox (the client fell too far
//!    behind), the send task ends and the socket is closed
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8080/ws');
//!
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({ type: "join", room: "R1", playerName: "A" }));
//! };
//!
//! ws.onmessage = (event) => {
//!   const data = JSON.parse(event.data);
//!   if (data.type === "start_game") {
//!     renderHand(data.deck);
//!   }
//! };
//! ```

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use shedding::{
    RoomError,
    entities::ConnectionId,
    messages::ServerMessage,
    net::errors::ProtocolError,
    utils::{decode_client_message, encode_server_message},
};
use std::sync::atomic::Ordering;
use tokio::sync::mpsc;

use super::{AppState, rate_limiter::ConnectionLimiter};
use crate::{logging, metrics};

/// Upgrade an HTTP connection to a game protocol WebSocket.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
///
/// Runs until the client closes the socket, the socket errors, or the
/// session actor drops or stops serving this connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection = ConnectionId::new();
    let connection_label = connection.to_string();
    let (mut sender, mut receiver) = socket.split();

    let mut limiter = ConnectionLimiter::new(&state.limits);

    // Messages routed by the session actor
    let (outbox_tx, mut outbox_rx) =
        mpsc::channel::<ServerMessage>(state.limits.outbound_buffer);

    // Replies generated here, before a frame reaches the actor
    let (response_tx, mut response_rx) = mpsc::channel::<String>(32);

    if state.sessions.connect(connection, outbox_tx).await.is_err() {
        error!("Session actor unavailable, dropping connection {}", connection);
        return;
    }

    let open = state.open_connections.fetch_add(1, Ordering::Relaxed) + 1;
    metrics::websocket_connections_total();
    metrics::websocket_connections_active(open);
    logging::log_connection_event(&connection_label, "connected", open);

    let mut send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                message = outbox_rx.recv() => {
                    // A closed outbox means the session actor dropped us.
                    let Some(message) = message else {
                        break;
                    };
                    if matches!(message, ServerMessage::Error { .. }) {
                        metrics::messages_rejected_total("room_error");
                    }
                    let json = match encode_server_message(&message) {
                        Ok(json) => json,
                        Err(e) => {
                            error!("Failed to serialize {} message: {}", message.kind(), e);
                            continue;
                        }
                    };
                    metrics::outbound_frame_bytes(json.len());
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                    metrics::websocket_messages_sent(message.kind());
                }
                Some(response_json) = response_rx.recv() => {
                    if sender.send(Message::Text(response_json.into())).await.is_err() {
                        break;
                    }
                    metrics::websocket_messages_sent("error");
                }
                else => break,
            }
        }
    });

    loop {
        let msg = tokio::select! {
            msg = receiver.next() => msg,
            _ = &mut send_task => {
                info!("Send task ended, closing connection {}", connection);
                break;
            }
        };
        let Some(msg) = msg else {
            break;
        };
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(limit) = limiter.check() {
                    warn!(
                        "{} rate limit exceeded for connection {}. Blocking message.",
                        limit.as_str(),
                        connection
                    );
                    metrics::rate_limit_hits_total(limit.as_str());
                    reply(&response_tx, ServerMessage::error(limit.message())).await;
                    continue;
                }

                match decode_client_message(text.as_str()) {
                    Ok(message) => {
                        metrics::messages_received_total(message.kind());
                        if state.sessions.inbound(connection, message).await.is_err() {
                            error!("Session actor closed while connection {} was open", connection);
                            break;
                        }
                    }
                    Err(e) => {
                        let reason = match e {
                            ProtocolError::MessageTooLarge { .. } => "too_large",
                            _ => "invalid_format",
                        };
                        metrics::messages_rejected_total(reason);
                        logging::log_rejected_message(&connection_label, reason, &e.to_string());
                        reply(&response_tx, RoomError::InvalidMessage.into()).await;
                    }
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed by client: connection={}", connection);
                break;
            }
            Err(e) => {
                warn!("WebSocket error on connection {}: {}", connection, e);
                break;
            }
            // Binary frames are not part of the protocol; pings are answered
            // by axum.
            _ => {}
        }
    }

    if state.sessions.disconnect(connection).await.is_err() {
        warn!("Session actor gone before connection {} unregistered", connection);
    }
    send_task.abort();

    let open = state
        .open_connections
        .fetch_sub(1, Ordering::Relaxed)
        .saturating_sub(1);
    metrics::websocket_connections_active(open);
    logging::log_connection_event(&connection_label, "disconnected", open);
}

/// Queue a locally generated reply for the send task.
async fn reply(response_tx: &mpsc::Sender<String>, message: ServerMessage) {
    match encode_server_message(&message) {
        Ok(json) => {
            let _ = response_tx.send(json).await;
        }
        Err(e) => error!("Failed to serialize reply: {}", e),
    }
}
