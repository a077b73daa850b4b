//! Error types shared by every Vision client crate.
//!
//! Only authentication failures are meant to cross the fetch boundary.
//! Per-page failures are modelled separately as
//! [`PageFailure`](crate::page::PageFailure) and never become an [`Error`]
//! during a fan-out.

use std::fmt;
use thiserror::Error;

/// The unified error type for Vision client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, body decoding).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors. Fatal to the whole fetch.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Non-success responses outside of a page fan-out.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (bad URL, resource path, page size).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Flat-file store errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns true if this error came from the authentication layer.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Response body could not be decoded.
    #[error("invalid response body: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token endpoint could not be reached.
    #[error("token endpoint unreachable: {0}")]
    Unreachable(#[source] TransportError),

    /// The token endpoint answered with a non-success status.
    #[error("token request rejected with HTTP {status}{}", detail_suffix(.message))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// The token response did not carry an `access_token` field.
    #[error("token response has no access_token")]
    MissingAccessToken,

    /// The token endpoint answered with a body that is not JSON.
    #[error("token response is not valid JSON: {message}")]
    InvalidResponse { message: String },

    /// The access token cannot be used as an HTTP header value.
    #[error("access token is not a valid header value")]
    MalformedToken,
}

fn detail_suffix(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {}", message),
        None => String::new(),
    }
}

/// A non-success HTTP response.
#[derive(Debug, Clone)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// The `detail` field of the error body, if the server sent one.
    pub detail: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, detail: Option<String>) -> Self {
        Self { status, detail }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid resource path.
    #[error("invalid resource path '{value}': {reason}")]
    ResourcePath { value: String, reason: String },

    /// Page size must be positive.
    #[error("page size must be greater than zero")]
    PageSize,
}

/// Flat-file store errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// Stored JSON could not be read or written.
    #[error("invalid JSON in {path}: {message}")]
    Json { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_includes_detail() {
        let err = Error::from(AuthError::Rejected {
            status: 401,
            message: Some("Incorrect username or password".to_string()),
        });
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("Incorrect username or password"));
        assert!(err.is_auth());
    }

    #[test]
    fn rejected_without_detail() {
        let err = AuthError::Rejected {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "token request rejected with HTTP 500");
    }

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::new(404, Some("Not Found".to_string()));
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
        assert_eq!(ProtocolError::new(401, None).to_string(), "HTTP 401");
    }
}
