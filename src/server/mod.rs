//! Server assembly
//!
//! Configuration loading, shared application state, and startup wiring.
//!
//! # Module Structure
//!
//! - `config`: environment-driven settings with development defaults
//! - `state`: the shared [`AppState`](state::AppState) container
//! - `init`: builds the application from a configuration

/// Environment configuration
pub mod config;
/// Startup wiring
pub mod init;
/// Shared application state
pub mod state;

pub use config::ServerConfig;
pub use init::create_app;
pub use state::AppState;
