//! Server timestamp helper.

/// Get the current timestamp as an RFC3339 string
///
/// All timestamps that leave the server (chat messages, notification
/// heartbeats, presence events) come from this one function so they share a
/// single format.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339()
}
