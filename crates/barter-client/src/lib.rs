//! Client
//!
//! HTTP surface of the Barter Trade chat backend as seen by the notifier: the
//! endpoint layout, REST calls that rebuild unread state, and the live channel
//! that pushes chat events.
//!
//! # Components
//!
//! - [`Endpoints`]: URLs for every chat route, rooted at one API origin
//! - [`SseDecoder`]: Incremental decoder for `text/event-stream` bodies
//! - [`api`]: Request and response shapes for the chat routes
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`api::ChatApi`]: REST client built on reqwest
//! - [`transport::Channel`]: Live channel over server-sent events or WebSocket
//! - [`transport::ChannelHandle`]: Receiving end of an open channel

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod api;
mod endpoints;
mod error;
mod sse;

#[cfg(feature = "transport")]
pub mod transport;

pub use endpoints::Endpoints;
pub use error::{ApiError, EndpointError, TransportError};
pub use sse::{MAX_LINE_BYTES, SseDecoder};
