//! Notifications
//!
//! Per-user server-push notifications over SSE. Each user holds at most
//! one live stream; delivery is at-most-once with nothing buffered for
//! offline users and nothing replayed on reconnect.
//!
//! # Module Structure
//!
//! - `channel`: user id to stream-slot routing
//! - `handlers`: the `/api/notifications/stream` SSE endpoint

/// Stream slot registry
pub mod channel;
/// SSE endpoint
pub mod handlers;

pub use channel::NotificationChannel;
