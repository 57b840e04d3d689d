/**
 * WebSocket Chat Handler
 *
 * Transport layer for the realtime chat protocol on `GET /ws`. The
 * socket speaks JSON-encoded tagged unions in both directions; every
 * inbound frame is decoded into a [`ClientEvent`] exactly once, here at
 * the edge, and everything past this module works with typed events.
 *
 * # Connection Lifecycle
 *
 * 1. Optional `token` query parameter resolves to a user id through the
 *    identity seam; a *present but invalid* token rejects the upgrade,
 *    while an absent token connects anonymously.
 * 2. The connection registers with the hub and gets its bounded outbound
 *    queue.
 * 3. A writer task drains that queue onto the socket; a reader task
 *    decodes frames and dispatches them to the hub.
 * 4. Whichever task finishes first aborts the other, and the connection
 *    is disconnected from the hub, which handles all room announcements
 *    and typing cleanup.
 *
 * # Error Reporting
 *
 * Rejected operations (unknown room, not a member, empty message) are
 * answered only to the offending connection as an `error` event and
 * never produce broadcast side effects.
 */
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::error::ApiError;
use crate::hub::{ConnectionHub, ConnectionId, HubError};
use crate::server::state::AppState;
use crate::shared::{ClientEvent, ServerEvent, UserId};

/// Query parameters for the WebSocket upgrade
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// Handle the WebSocket upgrade (GET /ws)
///
/// # Errors
///
/// * `401 Unauthorized` - a token was supplied but did not authenticate
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id: Option<UserId> = match query.token.as_deref() {
        Some(token) => Some(
            state
                .identity
                .authenticate(token)
                .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?,
        ),
        None => None,
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state.hub.clone(), user_id)))
}

async fn handle_socket(socket: WebSocket, hub: Arc<ConnectionHub>, user_id: Option<UserId>) {
    let (id, rx) = hub.register(user_id).await;
    let (sender, receiver) = socket.split();

    let mut send_task = writer_loop(rx, sender);
    let mut recv_task = reader_loop(receiver, hub.clone(), id);

    // Whichever side closes first tears the other down.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    hub.disconnect(id).await;
    tracing::info!("[Chat] Connection {} closed", id);
}

/// Drain the hub's outbound queue onto the socket
fn writer_loop(
    mut rx: mpsc::Receiver<ServerEvent>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("[Chat] Failed to serialize event: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Decode inbound frames and dispatch them to the hub
fn reader_loop(
    mut receiver: futures_util::stream::SplitStream<WebSocket>,
    hub: Arc<ConnectionHub>,
    id: ConnectionId,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::debug!("[Chat] Socket error on {}: {}", id, e);
                    break;
                }
            };
            match frame {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => dispatch(&hub, id, event).await,
                    Err(e) => {
                        tracing::debug!("[Chat] Undecodable frame from {}: {}", id, e);
                        hub.send_to(
                            id,
                            ServerEvent::Error {
                                message: "Invalid event format".to_string(),
                            },
                        )
                        .await;
                    }
                },
                Message::Close(_) => break,
                // Pings are answered by axum; binary frames are not part
                // of the protocol.
                _ => {}
            }
        }
    })
}

async fn dispatch(hub: &ConnectionHub, id: ConnectionId, event: ClientEvent) {
    match event {
        ClientEvent::JoinRoom { room } => {
            if let Err(err) = hub.join(id, &room).await {
                report(hub, id, err).await;
            }
        }
        ClientEvent::LeaveRoom { room } => {
            if let Err(err) = hub.leave(id, &room).await {
                report(hub, id, err).await;
            }
        }
        ClientEvent::ChatMessage {
            room,
            message,
            username,
        } => {
            if let Err(err) = hub.send(id, &room, &message, &username).await {
                report(hub, id, err).await;
            }
        }
        ClientEvent::Typing { room, username } => {
            // Typing is advisory; a rejected signal is not worth an
            // error frame.
            if let Err(err) = hub.start_typing(id, &room, &username).await {
                tracing::debug!("[Chat] Ignored typing signal from {}: {}", id, err);
            }
        }
        ClientEvent::StopTyping { room, username } => {
            if let Err(err) = hub.stop_typing(id, &room, &username).await {
                tracing::debug!("[Chat] Ignored stop-typing signal from {}: {}", id, err);
            }
        }
    }
}

async fn report(hub: &ConnectionHub, id: ConnectionId, err: HubError) {
    tracing::debug!("[Chat] Rejected event from {}: {}", id, err);
    hub.send_to(
        id,
        ServerEvent::Error {
            message: err.to_string(),
        },
    )
    .await;
}
