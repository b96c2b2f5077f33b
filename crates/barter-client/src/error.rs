//! Client error types.
//!
//! Errors are split by boundary: configuration of the API origin, REST calls,
//! and the live channel transport. Transport errors never propagate to the UI;
//! they are reported to the reconnection policy instead.

use thiserror::Error;

/// API origin could not be used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointError {
    /// Origin is not an absolute URL that can carry paths.
    #[error("invalid API origin: {0}")]
    InvalidOrigin(String),

    /// Origin scheme is not http or https.
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),
}

/// REST call failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Request could not be sent or the connection dropped.
    #[error("request failed: {0}")]
    Request(String),

    /// Request exceeded its deadline.
    #[error("request timed out")]
    Timeout,

    /// Server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Response body did not match the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns true if the same request may succeed later.
    ///
    /// Network failures, timeouts, throttling, and server errors are
    /// transient. Client errors and malformed responses are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(_) | Self::Timeout => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Decode(_) => false,
        }
    }
}

/// Live channel could not be opened or was lost.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Channel URL could not be built.
    #[error("endpoint error: {0}")]
    Endpoint(#[from] EndpointError),

    /// Connection could not be established.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Server refused the subscription.
    #[error("subscription rejected with HTTP {0}")]
    Rejected(u16),

    /// Stream failed after it was established.
    #[error("stream error: {0}")]
    Stream(String),
}
