//! Chat transport
//!
//! The WebSocket endpoint that carries the realtime chat protocol. All
//! protocol semantics live in the hub; this module only decodes frames,
//! dispatches typed events, and owns the socket lifecycle.

/// WebSocket upgrade and socket tasks
pub mod handler;

pub use handler::websocket_handler;
