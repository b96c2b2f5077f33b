//! Error types for the notification core.
//!
//! Decoding errors are recovered locally by discarding the offending payload;
//! they never reach the rendering layer. Validation errors are raised before
//! any request leaves the client.

use thiserror::Error;

/// Inbound payload could not be turned into an event.
///
/// Always recoverable: the payload is logged and dropped, the channel stays
/// open, and the reconnection policy is not charged a failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload was empty or whitespace only.
    #[error("empty payload")]
    Empty,

    /// Payload was not valid JSON or did not match a known event shape.
    #[error("malformed event: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Starting a conversation about a listing was refused locally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartChatError {
    /// No identity is available.
    #[error("sign in to chat with the seller")]
    NotSignedIn,

    /// The viewer is the seller of the listing.
    #[error("cannot start a chat about your own listing")]
    OwnListing,
}

/// Sending a message was refused locally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// No identity is available.
    #[error("sign in to send messages")]
    NotSignedIn,

    /// Message was empty after trimming.
    #[error("message is empty")]
    EmptyMessage,
}
