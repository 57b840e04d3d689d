/**
 * Notification Stream Handler
 *
 * SSE handler for `GET /api/notifications/stream`. Each authenticated
 * user gets at most one live stream; a new request for the same user
 * replaces the old stream, which ends when its receiver closes.
 *
 * # Stream Contents
 *
 * The response opens with a `{"type":"connected"}` handshake, then
 * interleaves pushed notifications with `{"type":"heartbeat"}` events
 * on a fixed interval. Heartbeats are real data events rather than SSE
 * comment lines because clients key on the `type` field.
 *
 * # Teardown
 *
 * A guard owned by the stream deregisters the slot when the response
 * body is dropped. Deregistration is id-checked so a stream that was
 * already replaced cannot tear down its successor.
 */
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::sse::{Event, Sse},
};
use futures_util::stream::{self, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval};
use uuid::Uuid;

use crate::error::ApiError;
use crate::identity::bearer_token;
use crate::server::state::AppState;
use crate::shared::notification::Notification;
use crate::shared::UserId;

use super::channel::NotificationChannel;

/// Query string for GET /api/notifications/stream
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub token: Option<String>,
}

/// Deregisters the stream slot when the SSE body is dropped
struct StreamGuard {
    channel: Arc<NotificationChannel>,
    user_id: UserId,
    stream_id: Uuid,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.channel.close_stream(&self.user_id, self.stream_id);
    }
}

struct StreamState {
    rx: mpsc::Receiver<Notification>,
    heartbeat: Interval,
    _guard: StreamGuard,
}

/// Handle a notification stream subscription
///
/// The token comes from the `token` query parameter (EventSource cannot
/// set headers) or an `Authorization: Bearer` header.
///
/// # Errors
///
/// * `401 Unauthorized` - missing or invalid token
pub async fn notification_stream(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let token = query
        .token
        .as_deref()
        .or_else(|| bearer_token(&headers))
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;
    let user_id = state
        .identity
        .authenticate(token)
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    let (stream_id, rx) = state.notifications.open_stream(&user_id);
    let guard = StreamGuard {
        channel: state.notifications.clone(),
        user_id,
        stream_id,
    };

    // First tick is one full period away; the handshake below covers t=0.
    let period = state.config.heartbeat_interval;
    let heartbeat = tokio::time::interval_at(Instant::now() + period, period);

    let handshake = stream::iter([Event::default().json_data(Notification::connected())]);
    let updates = stream::unfold(
        StreamState {
            rx,
            heartbeat,
            _guard: guard,
        },
        |mut s| async move {
            tokio::select! {
                received = s.rx.recv() => match received {
                    Some(notification) => Some((Event::default().json_data(notification), s)),
                    // Sender dropped: this stream was replaced.
                    None => None,
                },
                _ = s.heartbeat.tick() => {
                    Some((Event::default().json_data(Notification::heartbeat()), s))
                }
            }
        },
    );

    Ok(Sse::new(handshake.chain(updates)))
}
