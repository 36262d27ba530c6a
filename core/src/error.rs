//! Error types for the Warren API client.
//!
//! # Design
//! Every failure is returned as a value. Variants are grouped by where the
//! call stopped: before a request existed (`ConflictingBody`,
//! `Serialization`, `InvalidRequest`, `InvalidArgument`), on the wire
//! (`Transport`, `BodyRead`), or after the provider answered (`Api`,
//! `Deserialization`). `Api` keeps the raw response body so callers can read
//! provider-specific error payloads.

use thiserror::Error;

/// Errors produced while building, executing or decoding an API call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A request configuration carried both a form body and a JSON body.
    #[error("form data and json body can not be set at the same time")]
    ConflictingBody,

    /// The JSON payload could not be serialized into a JSON object.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The request could not be constructed: cancelled context, expired
    /// deadline, bad method token, malformed URL or header value.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No response was received (DNS, connect, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// A response arrived but its body could not be read in full.
    #[error("failed to read response body: {0}")]
    BodyRead(String),

    /// The provider answered with a status code of 400 or above.
    #[error("api call failed with status={status}: {body}")]
    Api { status: u16, body: String },

    /// The response body could not be decoded into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A resource wrapper rejected its input before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    InvalidRequest,
    Transport,
    BodyRead,
    Api,
    Decode,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::ConflictingBody | ApiError::Serialization(_) | ApiError::InvalidArgument(_) => {
                ErrorKind::Configuration
            }
            ApiError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::BodyRead(_) => ErrorKind::BodyRead,
            ApiError::Api { .. } => ErrorKind::Api,
            ApiError::Deserialization(_) => ErrorKind::Decode,
        }
    }

    /// HTTP status reported by the provider, if the call got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
