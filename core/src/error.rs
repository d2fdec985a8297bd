//! Error types for the staff API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." Login failure is deliberately a single opaque variant — callers
//! only branch on "logged in or not", so bad credentials and transport
//! trouble look the same. All other non-2xx responses land in `HttpError`
//! with the raw status code and body for debugging.

use std::fmt;

use crate::letter::EditorMode;

/// Errors returned by the client parse methods.
#[derive(Debug)]
pub enum ApiError {
    /// The server returned 404 — the requested resource does not exist.
    NotFound,

    /// The server rejected the login. The cause is not distinguished.
    AuthenticationFailed,

    /// A confirmed editor action is not permitted in the current mode.
    InvalidMode { required: EditorMode },

    /// The server returned a non-2xx status other than 404.
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    SerializationError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound => write!(f, "resource not found"),
            ApiError::AuthenticationFailed => write!(f, "login failed"),
            ApiError::InvalidMode { required } => {
                write!(f, "operation requires {required}")
            }
            ApiError::HttpError { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            ApiError::DeserializationError(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
            ApiError::SerializationError(msg) => {
                write!(f, "serialization failed: {msg}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
