//! Connection hub
//!
//! Realtime fan-out for room traffic. The hub owns connection
//! registration, room membership, and the ephemeral typing sets, and it
//! is the single ordering authority for everything a room's members see.
//!
//! # Architecture
//!
//! Each transport session registers once and receives a bounded queue;
//! the transport's writer task drains that queue onto the socket while
//! the hub enqueues into it under its state lock. Slow consumers drop
//! their own newest events instead of stalling the room.
//!
//! # Module Structure
//!
//! - `hub`: membership state, broadcast paths, and the send pipeline
//! - `connection`: the bounded per-connection outbound queue
//! - `typing`: ephemeral who-is-typing bookkeeping

/// Per-connection outbound queue
pub mod connection;
/// Membership and broadcast core
pub mod hub;
/// Typing indicator state
pub mod typing;

pub use connection::ConnectionId;
pub use hub::{ConnectionHub, HubError};
pub use typing::TypingTracker;
