//! WaveChat - Realtime Room Messaging Core
//!
//! WaveChat is the realtime backbone of a social platform: room-based
//! chat over WebSocket, per-user server-push notifications over SSE, and
//! MQTT-relayed presence, all in front of an in-memory room registry.
//!
//! # Overview
//!
//! The library provides:
//! - Room lifecycle (create, rename, delete, search) with append-only
//!   per-room message histories
//! - A connection hub that is the single ordering authority for
//!   everything a room's members see
//! - Typing indicators with disconnect-safe cleanup
//! - At-most-once per-user notification streams with heartbeats
//! - A stateless MQTT presence relay
//!
//! # Module Structure
//!
//! - **`shared`** - wire types used on both sides of the protocol
//!   - Chat messages, the client/server event unions, notifications
//! - **`rooms`** - room registry and the HTTP CRUD surface
//! - **`hub`** - connection registration, membership, and fan-out
//! - **`chat`** - the WebSocket transport
//! - **`notify`** - per-user SSE notification streams
//! - **`presence`** - MQTT status relay
//! - **`identity`** - token verification seam
//! - **`error`** - the API error taxonomy
//! - **`server`** - configuration, shared state, and startup wiring
//! - **`routes`** - router assembly
//!
//! # Usage
//!
//! ```rust,no_run
//! use wavechat::server::{create_app, ServerConfig};
//!
//! # async fn example() {
//! let app = create_app(ServerConfig::default()).await;
//! // Serve with axum
//! # }
//! ```

/// WebSocket chat transport
pub mod chat;
/// API error taxonomy
pub mod error;
/// Connection hub and typing state
pub mod hub;
/// Token verification seam
pub mod identity;
/// Per-user notification streams
pub mod notify;
/// MQTT presence relay
pub mod presence;
/// Room registry and CRUD handlers
pub mod rooms;
/// Router assembly
pub mod routes;
/// Configuration, state, and startup
pub mod server;
/// Shared wire types
pub mod shared;

pub use error::ApiError;
pub use hub::{ConnectionHub, HubError};
pub use notify::NotificationChannel;
pub use rooms::{RoomRegistry, RegistryError};
pub use server::{create_app, AppState, ServerConfig};
pub use shared::{ChatMessage, ClientEvent, Notification, PresenceStatus, ServerEvent};
