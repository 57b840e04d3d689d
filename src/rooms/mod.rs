//! Room management
//!
//! Room lifecycle and per-room message history. The registry is the
//! authoritative list of rooms; the HTTP handlers expose CRUD, search,
//! and message ingestion over it.
//!
//! # Module Structure
//!
//! - `registry`: rooms, sequential ids, and append-only histories
//! - `handlers`: the `/api/rooms` and `/api/messages` endpoints

/// HTTP handlers for the room and message APIs
pub mod handlers;
/// Room and history storage
pub mod registry;

pub use registry::{RegistryError, Room, RoomRegistry};
