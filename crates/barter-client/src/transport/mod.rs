//! Live channel transport.
//!
//! Provides [`Channel`], which opens the per-user event stream and hands back
//! a [`ChannelHandle`]. This is a thin layer that only moves raw payloads:
//! decoding, dispatch, and reconnection stay in the Sans-IO notifier.
//!
//! Two backends are supported. Server-sent events are the primary transport;
//! the WebSocket subscription carries the same payloads for deployments that
//! proxy it instead.

mod sse;
mod ws;

use std::{fmt, future::Future, str::FromStr};

use barter_core::UserId;
use tokio::sync::mpsc;

pub use self::{
    sse::{CONNECT_TIMEOUT, SseBackend},
    ws::WebSocketBackend,
};
use crate::{Endpoints, TransportError};

/// Buffered signals between the reader task and the consumer.
pub const SIGNAL_BUFFER: usize = 64;

/// What the reader task reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSignal {
    /// One complete payload, undecoded.
    Payload(String),
    /// Stream ended or failed. Always the last signal.
    Closed {
        /// Human-readable cause.
        reason: String,
    },
}

/// Handle to an open live channel.
///
/// Payloads are read from [`ChannelHandle::signals`]; an internal task does the
/// I/O. Dropping the handle stops the task, so a closed channel can never
/// deliver into a stale consumer.
#[derive(Debug)]
pub struct ChannelHandle {
    /// Signals from the reader task.
    pub signals: mpsc::Receiver<ChannelSignal>,
    abort_handle: tokio::task::AbortHandle,
}

impl ChannelHandle {
    pub(crate) fn new(signals: mpsc::Receiver<ChannelSignal>, abort_handle: tokio::task::AbortHandle) -> Self {
        Self { signals, abort_handle }
    }

    /// Stop the reader task.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}

/// Opens a live channel for one identity.
///
/// Both backends deliver the same [`ChannelSignal`] stream, so the
/// reconnection policy above them behaves identically whichever is used.
pub trait ChannelBackend: Send + Sync {
    /// Open the channel for `user`.
    ///
    /// Resolves once the server has accepted the subscription. Everything
    /// after that is reported through [`ChannelHandle::signals`].
    ///
    /// # Errors
    ///
    /// - `TransportError::Connection` if the server cannot be reached
    /// - `TransportError::Rejected` if it refuses the subscription
    fn open(&self, user: &UserId) -> impl Future<Output = Result<ChannelHandle, TransportError>> + Send;
}

/// Which transport carries the live channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// `GET /chat/events` as `text/event-stream`.
    #[default]
    Sse,
    /// `/chat/subscribe` upgraded to a WebSocket.
    WebSocket,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sse => f.write_str("sse"),
            Self::WebSocket => f.write_str("ws"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sse" | "events" => Ok(Self::Sse),
            "ws" | "websocket" => Ok(Self::WebSocket),
            other => Err(format!("unknown transport: {other} (expected sse or ws)")),
        }
    }
}

/// Opens live channels with the configured backend.
#[derive(Debug, Clone)]
pub enum Channel {
    /// Server-sent events.
    Sse(SseBackend),
    /// WebSocket subscription.
    WebSocket(WebSocketBackend),
}

impl Channel {
    /// Build a channel opener for `kind`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Connection` if the HTTP client cannot be built.
    pub fn new(kind: BackendKind, endpoints: Endpoints) -> Result<Self, TransportError> {
        match kind {
            BackendKind::Sse => Ok(Self::Sse(SseBackend::new(endpoints)?)),
            BackendKind::WebSocket => Ok(Self::WebSocket(WebSocketBackend::new(endpoints))),
        }
    }

    /// Backend in use.
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Sse(_) => BackendKind::Sse,
            Self::WebSocket(_) => BackendKind::WebSocket,
        }
    }
}

impl ChannelBackend for Channel {
    async fn open(&self, user: &UserId) -> Result<ChannelHandle, TransportError> {
        match self {
            Self::Sse(backend) => backend.open(user).await,
            Self::WebSocket(backend) => backend.open(user).await,
        }
    }
}
