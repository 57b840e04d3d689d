//! Server Error Types
//!
//! This module defines the HTTP-facing error type (`ApiError`) and its
//! conversions from the component-level errors (`HubError`,
//! `RegistryError`). Errors local to one connection's action are reported
//! only to that connection; background relay failures (the presence feed)
//! are retried with backoff and never become client-visible errors.

/// Error type definitions and conversions
pub mod types;

pub use types::ApiError;
