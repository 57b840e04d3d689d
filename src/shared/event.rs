/**
 * Chat Event System
 *
 * This module defines the tagged event unions exchanged over the chat
 * WebSocket. Incoming frames are decoded once, at the transport edge, into
 * `ClientEvent`; everything the server pushes to a connection is a
 * `ServerEvent`. The `type` field selects the variant on the wire, so a
 * frame looks like `{"type":"joinRoom","room":"General"}`.
 */
use serde::{Deserialize, Serialize};

use crate::shared::message::ChatMessage;

/// Events a client may send over the chat WebSocket
///
/// # Wire Format
///
/// ```json
/// {"type":"chatMessage","room":"General","message":"hi","username":"alice"}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Join a room; the server replies with the room history and announces
    /// the join to the other members
    JoinRoom { room: String },
    /// Leave a room; the server announces the departure to the remaining
    /// members
    LeaveRoom { room: String },
    /// Send a chat message to a room
    ChatMessage {
        room: String,
        message: String,
        username: String,
    },
    /// Signal that the user started typing in a room
    Typing { room: String, username: String },
    /// Signal that the user stopped typing in a room
    StopTyping { room: String, username: String },
}

/// Events the server pushes to a connection
///
/// Room-scoped events (`message`, `userTyping`, ...) are delivered only to
/// members of the room they concern. `userStatus` is global: every
/// registered connection receives it regardless of room membership.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Ordered history snapshot sent to a connection when it joins a room
    MessageHistory { messages: Vec<ChatMessage> },
    /// A chat message or system announcement broadcast to a room
    Message(ChatMessage),
    /// A user started typing in a room the connection has joined
    UserTyping { username: String },
    /// A user stopped typing in a room the connection has joined
    UserStopTyping { username: String },
    /// Global presence update relayed from the external status feed
    UserStatus {
        user_id: String,
        status: PresenceStatus,
    },
    /// Rejection of an operation initiated by this connection; never
    /// broadcast to anyone else
    Error { message: String },
}

/// Online/offline status of a user, as published by the presence feed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Offline,
}

impl PresenceStatus {
    /// Parse a raw feed payload (`"online"` / `"offline"`)
    ///
    /// Returns `None` for anything else; unknown payloads are dropped by
    /// the bridge rather than relayed.
    pub fn parse(payload: &str) -> Option<Self> {
        match payload {
            "online" => Some(Self::Online),
            "offline" => Some(Self::Offline),
            _ => None,
        }
    }
}
