//! Error types for the kudos API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." `InvalidArgument` covers encoder misuse — an unrecognized
//! encoding mode, a non-mapping payload forced into multipart, or a payload
//! nested past the recursion bound. It signals a programming error in the
//! calling code, never a runtime condition, so it is surfaced immediately
//! rather than retried or coerced.

use std::fmt;

/// Errors returned by `KudosClient` and the request-body encoder.
#[derive(Debug)]
pub enum ApiError {
    /// The server returned 404 — the requested resource does not exist.
    NotFound,

    /// The server returned a non-2xx status other than 404.
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    SerializationError(String),

    /// Caller misuse: bad encoding mode, non-mapping payload under forced
    /// multipart encoding, or payload nesting past `MAX_DEPTH`.
    InvalidArgument(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound => write!(f, "resource not found"),
            ApiError::HttpError { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            ApiError::DeserializationError(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
            ApiError::SerializationError(msg) => {
                write!(f, "serialization failed: {msg}")
            }
            ApiError::InvalidArgument(msg) => {
                write!(f, "invalid argument: {msg}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
