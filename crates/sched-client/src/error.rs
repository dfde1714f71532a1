//! Error taxonomy for the schedule API client.
//!
//! Every failure of a session listing call is returned through its result.
//! Nothing here is retried or logged by the client; callers decide.

use thiserror::Error;

/// Unified error type for client construction and requests
#[derive(Debug, Error)]
pub enum ClientError {
    /// Subdomain or API key missing at construction
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Configured endpoint is not a usable URL
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Connectivity, DNS, TLS or timeout failure
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Service answered with a non-success status
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Response body is not a list of session records
    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Caller cancelled the request before it completed
    #[error("Request cancelled")]
    Cancelled,
}

impl ClientError {
    /// Create a credentials error
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        ClientError::InvalidCredentials(message.into())
    }

    /// Wrap a reqwest failure, dropping the request URL.
    ///
    /// The URL carries the API key as a query parameter.
    pub fn transport(err: reqwest::Error) -> Self {
        ClientError::Transport(err.without_url())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }

    /// HTTP status code, for `HttpStatus` errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
