/**
 * Chat Message Data Structure
 *
 * This module defines the ChatMessage struct used for room chat messages
 * and their serialization for WebSocket and HTTP communication.
 *
 * Messages are append-only: once a message has been accepted by the hub it
 * is never mutated or reordered. The timestamp is always assigned by the
 * server at receipt, never taken from the client.
 */
use serde::{Deserialize, Serialize};

use crate::shared::time::timestamp_now;

/// Author name used for server-generated join/leave announcements.
pub const SYSTEM_USER: &str = "System";

/// Represents a single chat message inside a room
///
/// This structure is stored in the room history and broadcast to every
/// member of the room. It is serialized to/from JSON for communication
/// over the WebSocket and the HTTP message API.
///
/// # Fields
/// * `user` - The author's display name
/// * `text` - The message content
/// * `time` - ISO 8601 timestamp (RFC3339), assigned at server receipt
///
/// # Example
/// ```rust
/// use wavechat::shared::ChatMessage;
///
/// let message = ChatMessage::new("alice", "Hello, world!");
/// assert_eq!(message.user, "alice");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// The author's display name
    pub user: String,
    /// The message text content
    pub text: String,
    /// ISO 8601 timestamp (RFC3339 format), server-assigned
    pub time: String,
}

impl ChatMessage {
    /// Create a new message with the current server timestamp
    ///
    /// # Arguments
    /// * `user` - The author's display name
    /// * `text` - The message text
    pub fn new(user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            text: text.into(),
            time: timestamp_now(),
        }
    }

    /// Create a system-authored announcement (join/leave notices)
    ///
    /// System messages are broadcast to room members but never appended to
    /// the room history.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(SYSTEM_USER, text)
    }
}
