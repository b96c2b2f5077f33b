//! Driver errors.

use barter_client::{ApiError, EndpointError, TransportError};
use thiserror::Error;

/// Errors from building the live driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// API origin is unusable.
    #[error("endpoint error: {0}")]
    Endpoint(#[from] EndpointError),

    /// HTTP client could not be built.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Channel backend could not be built.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
