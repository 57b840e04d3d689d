//! Shared Wire Types
//!
//! This module contains the data structures that cross the transport edge:
//! chat messages, client/server chat events, presence events, and
//! notification stream payloads. Everything here is a plain serde type;
//! dynamic `{"type": ...}` payloads are decoded once at the edge into the
//! tagged unions defined below and stay strongly typed inside the core.
//!
//! # Module Structure
//!
//! ```text
//! shared/
//! ├── mod.rs          - Module exports
//! ├── message.rs      - ChatMessage data structure
//! ├── event.rs        - ClientEvent / ServerEvent tagged unions
//! ├── notification.rs - Notification stream payloads
//! └── time.rs         - Server timestamp helper
//! ```

/// Chat message data structure
pub mod message;

/// Client and server chat event types
pub mod event;

/// Notification stream payloads
pub mod notification;

/// Server timestamp helper
pub mod time;

/// Identifier of an authenticated user.
///
/// The core never interprets this value; it is handed in by the identity
/// collaborator and used only as a routing key.
pub type UserId = String;

// Re-export commonly used types
pub use event::{ClientEvent, PresenceStatus, ServerEvent};
pub use message::ChatMessage;
pub use notification::Notification;
