//! Error types for here-maps-mcp
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

use crate::polyline::DecodeError;

/// All error types that can occur while serving a tool call
#[derive(Debug, Error)]
pub enum MapsError {
    /// Transport-level failure talking to the upstream service
    #[error("HTTP error: {0}")]
    Http(String),

    /// Upstream answered with a non-success status
    #[error("HERE API error {status}: {body}")]
    Status { status: u16, body: String },

    /// Tool arguments did not match the declared schema
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// Upstream JSON did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Encoded route geometry could not be decoded
    #[error("Polyline decode error: {0}")]
    Polyline(#[from] DecodeError),

    /// A request URL could not be constructed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Host protocol framing error
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for MapsError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the credential as a query parameter
        MapsError::Http(err.without_url().to_string())
    }
}

/// Result type alias for here-maps-mcp operations
pub type Result<T> = std::result::Result<T, MapsError>;
