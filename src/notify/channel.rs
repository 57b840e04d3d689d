/**
 * Notification Channel
 *
 * Per-user push state for the SSE notification stream. Each user holds
 * at most one live stream; opening a second stream for the same user
 * replaces the first, whose receiver then closes and tears the old
 * response down.
 *
 * Delivery is at-most-once and only to currently connected users.
 * Nothing is buffered for offline users and nothing is replayed on
 * reconnect.
 */
use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::shared::notification::Notification;
use crate::shared::UserId;

/// Events queued per stream before the newest is dropped
const STREAM_BUFFER: usize = 32;

struct Slot {
    stream_id: Uuid,
    tx: mpsc::Sender<Notification>,
}

/// Routes notifications to each user's single live stream
///
/// The lock is a synchronous `RwLock`: every critical section is a map
/// lookup or insert, and keeping the API non-async lets stream teardown
/// run from a `Drop` guard.
#[derive(Default)]
pub struct NotificationChannel {
    slots: RwLock<HashMap<UserId, Slot>>,
}

impl NotificationChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a stream for `user_id`, replacing any existing one
    ///
    /// Returns the stream id (needed to close this specific stream
    /// later) and the receiver the SSE response drains. The replaced
    /// slot's sender is dropped, which closes the old stream's receiver.
    pub fn open_stream(&self, user_id: &str) -> (Uuid, mpsc::Receiver<Notification>) {
        let stream_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let replaced = self
            .slots
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user_id.to_string(), Slot { stream_id, tx });
        if replaced.is_some() {
            tracing::info!("[Notify] Replaced notification stream for user {}", user_id);
        } else {
            tracing::info!("[Notify] Opened notification stream for user {}", user_id);
        }
        (stream_id, rx)
    }

    /// Close a stream, but only if it is still the user's current one
    ///
    /// A stream that was already replaced must not tear down its
    /// successor, so the stream id has to match.
    pub fn close_stream(&self, user_id: &str, stream_id: Uuid) {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        if slots
            .get(user_id)
            .map(|slot| slot.stream_id == stream_id)
            .unwrap_or(false)
        {
            slots.remove(user_id);
            tracing::info!("[Notify] Closed notification stream for user {}", user_id);
        }
    }

    /// Push a notification to a user's live stream, if any
    ///
    /// Returns whether the event was queued. A missing stream or a full
    /// buffer drops the event; notifications are best-effort.
    pub fn send(&self, user_id: &str, notification: Notification) -> bool {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        match slots.get(user_id) {
            Some(slot) => match slot.tx.try_send(notification) {
                Ok(()) => true,
                Err(_) => {
                    tracing::debug!("[Notify] Dropped notification for user {}", user_id);
                    false
                }
            },
            None => false,
        }
    }

    /// Whether the user currently holds a live stream
    pub fn is_connected(&self, user_id: &str) -> bool {
        self.slots
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(user_id)
    }
}
