/**
 * Server Error Types
 *
 * This module defines the error type used by the HTTP handlers and its
 * conversions from the core component errors.
 *
 * # Error Categories
 *
 * - Validation errors (missing room name, empty message text): rejected
 *   synchronously to the caller, no side effects
 * - Not-found errors (room does not exist): surfaced to the caller, no
 *   partial state change
 * - Conflict errors (duplicate room name)
 * - Unauthorized errors (missing/invalid identity token)
 * - Internal errors (should not happen in practice)
 *
 * Delivery failures on individual connections are deliberately NOT part of
 * this taxonomy: they are isolated per connection inside the hub and never
 * surfaced to the sender of a broadcast.
 */
use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

use crate::hub::HubError;
use crate::rooms::RegistryError;

/// Errors returned to HTTP clients
///
/// Each variant maps to an HTTP status code and is rendered as the JSON
/// body `{"message": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request input (missing or empty fields)
    #[error("{message}")]
    Validation { message: String },

    /// Missing or invalid identity token
    #[error("{message}")]
    Unauthorized { message: String },

    /// Requested entity does not exist
    #[error("{message}")]
    NotFound { message: String },

    /// Request conflicts with existing state
    #[error("{message}")]
    Conflict { message: String },

    /// Unexpected server-side failure
    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message }
            | Self::Unauthorized { message }
            | Self::NotFound { message }
            | Self::Conflict { message }
            | Self::Internal { message } => message,
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::DuplicateName(_) => {
                Self::conflict("Room with this name already exists")
            }
            RegistryError::NotFound(_) => Self::not_found("Room not found"),
            RegistryError::UnknownRoom(_) => Self::not_found("Room not found"),
        }
    }
}

impl From<HubError> for ApiError {
    fn from(err: HubError) -> Self {
        match err {
            HubError::RoomNotFound(_) => Self::not_found("Room not found"),
            HubError::EmptyMessage => Self::validation("Message text is required"),
            HubError::NotAMember(room) => {
                Self::validation(format!("Not a member of room: {room}"))
            }
            HubError::UnknownConnection => Self::internal("Unknown connection"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({ "message": self.message() }));
        (status, body).into_response()
    }
}
