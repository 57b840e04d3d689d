/**
 * Notification Stream Payloads
 *
 * This module defines the events written to a user's notification stream
 * (the long-lived server-to-client SSE channel). The stream carries three
 * kinds of traffic:
 *
 * - A `connected` handshake, emitted immediately when the stream opens
 * - A `heartbeat` at a fixed interval, which keeps intermediary proxies
 *   from timing the stream out and doubles as a liveness probe
 * - Domain events produced by the CRUD layer after a write succeeds
 *   (`friend_added`, `new_post`)
 *
 * Delivery is at-most-once and best-effort: a user with no open stream
 * simply misses the event. There is no durable notification log.
 */
use serde::{Deserialize, Serialize};

use crate::shared::time::timestamp_now;

/// Maximum number of characters of post content included in a `new_post`
/// notification preview.
const PREVIEW_LEN: usize = 50;

/// A single event on a user's notification stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Notification {
    /// Handshake acknowledging the stream is open
    Connected { message: String },
    /// Periodic liveness heartbeat
    Heartbeat { time: String },
    /// Someone added the recipient as a friend
    FriendAdded {
        message: String,
        from: String,
        time: String,
    },
    /// A friend published a new post
    NewPost {
        message: String,
        from: String,
        post_id: i64,
        preview: String,
        time: String,
    },
}

impl Notification {
    /// Handshake event emitted when a stream opens
    pub fn connected() -> Self {
        Self::Connected {
            message: "Connected to notifications".to_string(),
        }
    }

    /// Heartbeat event with the current server time
    pub fn heartbeat() -> Self {
        Self::Heartbeat {
            time: timestamp_now(),
        }
    }

    /// Notification that `from` added the recipient as a friend
    pub fn friend_added(from: impl Into<String>) -> Self {
        let from = from.into();
        Self::FriendAdded {
            message: format!("{from} added you as a friend!"),
            from,
            time: timestamp_now(),
        }
    }

    /// Notification that `from` published a new post
    ///
    /// The preview is the first [`PREVIEW_LEN`] characters of the content,
    /// with an ellipsis appended when the content was truncated.
    pub fn new_post(from: impl Into<String>, post_id: i64, content: &str) -> Self {
        let from = from.into();
        let content = content.trim();
        let preview: String = content.chars().take(PREVIEW_LEN).collect();
        let preview = if content.chars().count() > PREVIEW_LEN {
            format!("{preview}...")
        } else {
            preview
        };
        Self::NewPost {
            message: format!("{from} published a new post!"),
            from,
            post_id,
            preview,
            time: timestamp_now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connected_wire_format() {
        let value = serde_json::to_value(Notification::connected()).unwrap();
        assert_eq!(value["type"], "connected");
        assert_eq!(value["message"], "Connected to notifications");
    }

    #[test]
    fn test_heartbeat_has_time() {
        let value = serde_json::to_value(Notification::heartbeat()).unwrap();
        assert_eq!(value["type"], "heartbeat");
        assert!(value["time"].as_str().is_some());
    }

    #[test]
    fn test_friend_added_message() {
        let value = serde_json::to_value(Notification::friend_added("bob")).unwrap();
        assert_eq!(value["type"], "friend_added");
        assert_eq!(value["message"], "bob added you as a friend!");
        assert_eq!(value["from"], "bob");
    }

    #[test]
    fn test_new_post_short_content_is_not_truncated() {
        let n = Notification::new_post("bob", 7, "short post");
        match n {
            Notification::NewPost {
                post_id, preview, ..
            } => {
                assert_eq!(post_id, 7);
                assert_eq!(preview, "short post");
            }
            other => panic!("expected NewPost, got {other:?}"),
        }
    }

    #[test]
    fn test_new_post_long_content_gets_ellipsis() {
        let content = "x".repeat(80);
        let n = Notification::new_post("bob", 7, &content);
        match n {
            Notification::NewPost { preview, .. } => {
                assert_eq!(preview, format!("{}...", "x".repeat(50)));
            }
            other => panic!("expected NewPost, got {other:?}"),
        }
    }

    #[test]
    fn test_new_post_field_name_is_camel_case() {
        let value = serde_json::to_value(Notification::new_post("bob", 7, "hi")).unwrap();
        assert_eq!(value["type"], "new_post");
        assert_eq!(value["postId"], 7);
    }

    #[test]
    fn test_notification_roundtrip() {
        let n = Notification::new_post("bob", 1, "hello world");
        let json = serde_json::to_string(&n).unwrap();
        let deserialized: Notification = serde_json::from_str(&json).unwrap();
        assert_eq!(n, deserialized);
    }
}
