//! Routes
//!
//! HTTP route assembly for the chat server.

/// Router construction
pub mod router;

pub use router::create_router;
