/**
 * Connection Hub
 *
 * This is the concurrency core: it routes room-scoped events to the right
 * set of connections and maintains the membership invariants under
 * concurrent joins, leaves, sends, and disconnects.
 *
 * # Locking
 *
 * All membership state (room -> members, connection -> rooms, typing
 * entries) lives behind one `tokio::sync::RwLock`. Whole-table locking is
 * deliberate at this scale; the critical sections never touch the network.
 * Delivery is a non-blocking `try_send` into each member's bounded queue,
 * so enqueueing happens *inside* the critical section while the actual
 * socket writes happen in per-connection writer tasks outside it. Doing
 * the enqueue under the lock is what gives every room a single logical
 * event sequence: two sends serialized by the lock are observed in lock
 * order by every member.
 *
 * When the hub also needs the room registry it always takes the hub state
 * lock first and the registry lock second.
 *
 * # Backpressure
 *
 * A connection whose queue is full loses the newest event (for that
 * connection only). The broadcaster never blocks and never learns about
 * individual delivery failures; dead connections are reaped when their
 * transport task runs `disconnect`.
 */
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, RwLock};

use crate::rooms::{RegistryError, RoomRegistry};
use crate::shared::message::ChatMessage;
use crate::shared::{ServerEvent, UserId};

use super::connection::{ConnectionId, ConnectionSender};
use super::typing::TypingTracker;

/// Join announcement text, matching the system message users see
const JOINED_TEXT: &str = "New user joined the room";
/// Leave announcement text
const LEFT_TEXT: &str = "User left the room";

/// Errors for operations initiated by a single connection
///
/// These are reported only to the initiating connection and never abort
/// delivery to anyone else.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HubError {
    /// The target room is not registered
    #[error("room not found: {0}")]
    RoomNotFound(String),

    /// The connection tried to send into a room it has not joined
    #[error("not a member of room: {0}")]
    NotAMember(String),

    /// Empty message text
    #[error("message text must not be empty")]
    EmptyMessage,

    /// The connection handle is not registered (already disconnected)
    #[error("unknown connection")]
    UnknownConnection,
}

struct ConnectionEntry {
    sender: ConnectionSender,
    user_id: Option<UserId>,
    rooms: HashSet<String>,
}

#[derive(Default)]
struct HubState {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    rooms: HashMap<String, HashSet<ConnectionId>>,
    typing: TypingTracker,
}

impl HubState {
    /// Deliver an event to every member of `room`, optionally excluding one
    /// connection. Fire-and-forget per connection.
    fn broadcast_room(
        &self,
        room: &str,
        event: &ServerEvent,
        exclude: Option<ConnectionId>,
    ) {
        let Some(members) = self.rooms.get(room) else {
            return;
        };
        for id in members {
            if Some(*id) == exclude {
                continue;
            }
            if let Some(entry) = self.connections.get(id) {
                entry.sender.deliver(event.clone());
            }
        }
    }
}

/// Routes room-scoped events to the correct connections
pub struct ConnectionHub {
    registry: Arc<RwLock<RoomRegistry>>,
    state: RwLock<HubState>,
    buffer_capacity: usize,
}

impl ConnectionHub {
    /// Create a hub over the given registry
    ///
    /// `buffer_capacity` bounds each connection's outbound queue.
    pub fn new(registry: Arc<RwLock<RoomRegistry>>, buffer_capacity: usize) -> Self {
        Self {
            registry,
            state: RwLock::new(HubState::default()),
            buffer_capacity,
        }
    }

    /// Register a new transport session
    ///
    /// Returns the connection id and the receiver the transport's writer
    /// task drains onto the socket. No side effects beyond local state.
    pub async fn register(
        &self,
        user_id: Option<UserId>,
    ) -> (ConnectionId, mpsc::Receiver<ServerEvent>) {
        let id = ConnectionId::new_v4();
        let (sender, rx) = ConnectionSender::new(self.buffer_capacity);
        let mut state = self.state.write().await;
        state.connections.insert(
            id,
            ConnectionEntry {
                sender,
                user_id,
                rooms: HashSet::new(),
            },
        );
        tracing::debug!("[Hub] Connection {} registered", id);
        (id, rx)
    }

    /// Join a room
    ///
    /// The room's history snapshot is queued to the joiner (and also
    /// returned) on every join attempt, so a re-joining client always gets
    /// its `messageHistory` frame. Membership itself is idempotent: only a
    /// first join adds the connection to the room and sends the
    /// system-authored "joined" announcement to the *other* current
    /// members. Fails with [`HubError::RoomNotFound`] for unregistered
    /// rooms.
    pub async fn join(
        &self,
        id: ConnectionId,
        room: &str,
    ) -> Result<Vec<ChatMessage>, HubError> {
        let mut state = self.state.write().await;
        if !state.connections.contains_key(&id) {
            return Err(HubError::UnknownConnection);
        }

        let history = {
            let registry = self.registry.read().await;
            registry
                .history(room)
                .ok_or_else(|| HubError::RoomNotFound(room.to_string()))?
                .to_vec()
        };

        let entry = state
            .connections
            .get_mut(&id)
            .ok_or(HubError::UnknownConnection)?;
        let first_join = entry.rooms.insert(room.to_string());
        // The joiner gets the snapshot on every join attempt; only a first
        // join announces to the other members.
        entry.sender.deliver(ServerEvent::MessageHistory {
            messages: history.clone(),
        });
        if !first_join {
            return Ok(history);
        }
        state
            .rooms
            .entry(room.to_string())
            .or_default()
            .insert(id);
        state.broadcast_room(
            room,
            &ServerEvent::Message(ChatMessage::system(JOINED_TEXT)),
            Some(id),
        );
        tracing::debug!("[Hub] Connection {} joined room '{}'", id, room);
        Ok(history)
    }

    /// Leave a room
    ///
    /// Idempotent: leaving a room the connection is not in does nothing.
    /// Otherwise the remaining members get a system "left" announcement,
    /// and any typing entries this connection owned in the room are
    /// cleared with matching stop-typing events.
    pub async fn leave(&self, id: ConnectionId, room: &str) -> Result<(), HubError> {
        let mut state = self.state.write().await;
        let entry = state
            .connections
            .get_mut(&id)
            .ok_or(HubError::UnknownConnection)?;
        if !entry.rooms.remove(room) {
            return Ok(());
        }
        if let Some(members) = state.rooms.get_mut(room) {
            members.remove(&id);
            if members.is_empty() {
                state.rooms.remove(room);
            }
        }
        for username in state.typing.purge_room(id, room) {
            state.broadcast_room(room, &ServerEvent::UserStopTyping { username }, None);
        }
        state.broadcast_room(
            room,
            &ServerEvent::Message(ChatMessage::system(LEFT_TEXT)),
            None,
        );
        tracing::debug!("[Hub] Connection {} left room '{}'", id, room);
        Ok(())
    }

    /// Send a chat message into a room
    ///
    /// The message gets a server-assigned timestamp, is appended to the
    /// room history, and is broadcast to every current member *including
    /// the sender* — the sender renders its own message from the broadcast
    /// so there is a single ordering authority. Fails if the connection is
    /// not a member of the room or the room is unregistered.
    pub async fn send(
        &self,
        id: ConnectionId,
        room: &str,
        text: &str,
        username: &str,
    ) -> Result<ChatMessage, HubError> {
        if text.trim().is_empty() {
            return Err(HubError::EmptyMessage);
        }
        let mut state = self.state.write().await;
        let entry = state
            .connections
            .get(&id)
            .ok_or(HubError::UnknownConnection)?;
        if !entry.rooms.contains(room) {
            return Err(HubError::NotAMember(room.to_string()));
        }

        let message = self.append_to_registry(room, username, text).await?;

        if state.typing.clear_for_message(room, username) {
            state.broadcast_room(
                room,
                &ServerEvent::UserStopTyping {
                    username: username.to_string(),
                },
                Some(id),
            );
        }
        state.broadcast_room(room, &ServerEvent::Message(message.clone()), None);
        Ok(message)
    }

    /// Append a message and broadcast it without a membership check
    ///
    /// Server-side ingestion path for the HTTP message API: the CRUD layer
    /// posts on behalf of a user who may have no live connection. The room
    /// must still be registered.
    pub async fn publish(
        &self,
        room: &str,
        text: &str,
        username: &str,
    ) -> Result<ChatMessage, HubError> {
        if text.trim().is_empty() {
            return Err(HubError::EmptyMessage);
        }
        let state = self.state.write().await;
        let message = self.append_to_registry(room, username, text).await?;
        state.broadcast_room(room, &ServerEvent::Message(message.clone()), None);
        Ok(message)
    }

    /// Disconnect a connection
    ///
    /// Removes the connection from every room it was a member of, emitting
    /// one "left" announcement per room and clearing any typing entries it
    /// owned, then discards the bookkeeping. Safe to call more than once;
    /// later calls are no-ops.
    pub async fn disconnect(&self, id: ConnectionId) {
        let mut state = self.state.write().await;
        let Some(entry) = state.connections.remove(&id) else {
            return;
        };
        for (room, username) in state.typing.purge_connection(id) {
            state.broadcast_room(&room, &ServerEvent::UserStopTyping { username }, None);
        }
        for room in entry.rooms {
            if let Some(members) = state.rooms.get_mut(&room) {
                members.remove(&id);
                if members.is_empty() {
                    state.rooms.remove(&room);
                }
            }
            state.broadcast_room(
                &room,
                &ServerEvent::Message(ChatMessage::system(LEFT_TEXT)),
                None,
            );
        }
        match entry.user_id {
            Some(user) => tracing::debug!("[Hub] Connection {} (user {}) disconnected", id, user),
            None => tracing::debug!("[Hub] Connection {} disconnected", id),
        }
    }

    /// Record a typing signal and announce it to the other room members
    ///
    /// Requires membership, like `send`. The announcement goes to everyone
    /// in the room except the typist.
    pub async fn start_typing(
        &self,
        id: ConnectionId,
        room: &str,
        username: &str,
    ) -> Result<(), HubError> {
        let mut state = self.state.write().await;
        let entry = state
            .connections
            .get(&id)
            .ok_or(HubError::UnknownConnection)?;
        if !entry.rooms.contains(room) {
            return Err(HubError::NotAMember(room.to_string()));
        }
        state.typing.start(id, room, username);
        state.broadcast_room(
            room,
            &ServerEvent::UserTyping {
                username: username.to_string(),
            },
            Some(id),
        );
        Ok(())
    }

    /// Record a stop-typing signal and announce it to the other members
    pub async fn stop_typing(
        &self,
        id: ConnectionId,
        room: &str,
        username: &str,
    ) -> Result<(), HubError> {
        let mut state = self.state.write().await;
        let entry = state
            .connections
            .get(&id)
            .ok_or(HubError::UnknownConnection)?;
        if !entry.rooms.contains(room) {
            return Err(HubError::NotAMember(room.to_string()));
        }
        state.typing.stop(id, room, username);
        state.broadcast_room(
            room,
            &ServerEvent::UserStopTyping {
                username: username.to_string(),
            },
            Some(id),
        );
        Ok(())
    }

    /// Deliver an event to every registered connection, regardless of room
    ///
    /// Used by the presence bridge: presence is global. No relative
    /// ordering is promised against room traffic, so a read lock is
    /// enough.
    pub async fn broadcast_all(&self, event: ServerEvent) {
        let state = self.state.read().await;
        for entry in state.connections.values() {
            entry.sender.deliver(event.clone());
        }
    }

    /// Deliver an event to one specific connection
    ///
    /// Used by the transport to report a rejected operation back to the
    /// connection that initiated it.
    pub async fn send_to(&self, id: ConnectionId, event: ServerEvent) {
        let state = self.state.read().await;
        if let Some(entry) = state.connections.get(&id) {
            entry.sender.deliver(event);
        }
    }

    /// Rooms the connection is currently a member of, sorted
    pub async fn joined_rooms(&self, id: ConnectionId) -> Vec<String> {
        let state = self.state.read().await;
        let mut rooms: Vec<String> = state
            .connections
            .get(&id)
            .map(|e| e.rooms.iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    /// Number of members currently in `room`
    pub async fn member_count(&self, room: &str) -> usize {
        let state = self.state.read().await;
        state.rooms.get(room).map(|m| m.len()).unwrap_or(0)
    }

    /// Display names currently typing in `room`, sorted
    pub async fn typing_users(&self, room: &str) -> Vec<String> {
        let state = self.state.read().await;
        state.typing.typing_users(room)
    }

    async fn append_to_registry(
        &self,
        room: &str,
        username: &str,
        text: &str,
    ) -> Result<ChatMessage, HubError> {
        let message = ChatMessage::new(username, text);
        let mut registry = self.registry.write().await;
        registry
            .append_message(room, message.clone())
            .map_err(|err| match err {
                RegistryError::UnknownRoom(name) => HubError::RoomNotFound(name),
                other => {
                    // append_message only ever reports UnknownRoom today.
                    tracing::error!("[Hub] Unexpected registry error on append: {other}");
                    HubError::RoomNotFound(room.to_string())
                }
            })?;
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::PresenceStatus;

    fn registry_with(rooms: &[&str]) -> Arc<RwLock<RoomRegistry>> {
        let mut registry = RoomRegistry::new();
        for room in rooms {
            registry.create(room, "", None).unwrap();
        }
        Arc::new(RwLock::new(registry))
    }

    #[tokio::test]
    async fn test_join_unknown_room_is_rejected() {
        let hub = ConnectionHub::new(registry_with(&[]), 8);
        let (id, _rx) = hub.register(None).await;
        let err = hub.join(id, "ghost").await.unwrap_err();
        assert_eq!(err, HubError::RoomNotFound("ghost".to_string()));
        assert!(hub.joined_rooms(id).await.is_empty());
    }

    #[tokio::test]
    async fn test_send_requires_membership() {
        let hub = ConnectionHub::new(registry_with(&["general"]), 8);
        let (id, _rx) = hub.register(None).await;
        let err = hub.send(id, "general", "hi", "alice").await.unwrap_err();
        assert_eq!(err, HubError::NotAMember("general".to_string()));
    }

    #[tokio::test]
    async fn test_send_rejects_empty_text() {
        let hub = ConnectionHub::new(registry_with(&["general"]), 8);
        let (id, _rx) = hub.register(None).await;
        hub.join(id, "general").await.unwrap();
        let err = hub.send(id, "general", "   ", "alice").await.unwrap_err();
        assert_eq!(err, HubError::EmptyMessage);
    }

    #[tokio::test]
    async fn test_join_is_idempotent() {
        let hub = ConnectionHub::new(registry_with(&["general"]), 8);
        let (id, _rx) = hub.register(None).await;
        hub.join(id, "general").await.unwrap();
        hub.join(id, "general").await.unwrap();
        assert_eq!(hub.joined_rooms(id).await, vec!["general"]);
        assert_eq!(hub.member_count("general").await, 1);
    }

    #[tokio::test]
    async fn test_rejoin_redelivers_history_without_reannouncing() {
        let hub = ConnectionHub::new(registry_with(&["general"]), 8);
        let (alice, mut rx_alice) = hub.register(None).await;
        let (bob, mut rx_bob) = hub.register(None).await;
        hub.join(alice, "general").await.unwrap();
        hub.join(bob, "general").await.unwrap();
        while rx_alice.try_recv().is_ok() {}
        while rx_bob.try_recv().is_ok() {}

        hub.join(alice, "general").await.unwrap();

        // The re-joining client still gets its snapshot frame.
        assert!(matches!(
            rx_alice.try_recv(),
            Ok(ServerEvent::MessageHistory { .. })
        ));
        // The other member hears no second "joined" announcement.
        assert!(rx_bob.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_leave_is_idempotent() {
        let hub = ConnectionHub::new(registry_with(&["general"]), 8);
        let (id, mut rx) = hub.register(None).await;
        hub.join(id, "general").await.unwrap();
        let _ = rx.try_recv();

        hub.leave(id, "general").await.unwrap();
        hub.leave(id, "general").await.unwrap();
        // Leaving a room never joined is also a no-op.
        hub.leave(id, "random-room").await.unwrap();

        // The leaver is out of the room before the announcement goes out.
        assert!(rx.try_recv().is_err());
        assert!(hub.joined_rooms(id).await.is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent_and_clears_membership() {
        let hub = ConnectionHub::new(registry_with(&["general", "random"]), 8);
        let (id, _rx) = hub.register(None).await;
        hub.join(id, "general").await.unwrap();
        hub.join(id, "random").await.unwrap();

        hub.disconnect(id).await;
        hub.disconnect(id).await;

        assert!(hub.joined_rooms(id).await.is_empty());
        assert_eq!(hub.member_count("general").await, 0);
        assert_eq!(hub.member_count("random").await, 0);
        assert_eq!(
            hub.join(id, "general").await.unwrap_err(),
            HubError::UnknownConnection
        );
    }

    #[tokio::test]
    async fn test_broadcast_all_reaches_every_connection() {
        let hub = ConnectionHub::new(registry_with(&["general"]), 8);
        let (_a, mut rx_a) = hub.register(Some("u1".to_string())).await;
        let (_b, mut rx_b) = hub.register(None).await;

        hub.broadcast_all(ServerEvent::UserStatus {
            user_id: "42".to_string(),
            status: PresenceStatus::Online,
        })
        .await;

        assert!(matches!(
            rx_a.try_recv().unwrap(),
            ServerEvent::UserStatus { .. }
        ));
        assert!(matches!(
            rx_b.try_recv().unwrap(),
            ServerEvent::UserStatus { .. }
        ));
    }

    #[tokio::test]
    async fn test_publish_reaches_members_without_membership_check() {
        let hub = ConnectionHub::new(registry_with(&["general"]), 8);
        let (id, mut rx) = hub.register(None).await;
        hub.join(id, "general").await.unwrap();
        // Drain the history snapshot from the join.
        let _ = rx.try_recv();

        let message = hub.publish("general", "posted", "carol").await.unwrap();
        assert_eq!(message.user, "carol");
        match rx.try_recv().unwrap() {
            ServerEvent::Message(m) => assert_eq!(m.text, "posted"),
            other => panic!("expected message, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_publish_to_unknown_room_fails() {
        let hub = ConnectionHub::new(registry_with(&[]), 8);
        let err = hub.publish("ghost", "hi", "carol").await.unwrap_err();
        assert_eq!(err, HubError::RoomNotFound("ghost".to_string()));
    }
}
