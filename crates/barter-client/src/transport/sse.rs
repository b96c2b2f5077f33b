//! Server-sent events backend.

use std::time::Duration;

use barter_core::UserId;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use tokio::sync::mpsc;

use super::{ChannelBackend, ChannelHandle, ChannelSignal, SIGNAL_BUFFER};
use crate::{Endpoints, SseDecoder, TransportError};

/// Time allowed to establish the TCP/TLS connection.
///
/// There is no overall request deadline: the body is an open-ended stream.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens `GET /chat/events` streams.
#[derive(Debug, Clone)]
pub struct SseBackend {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl SseBackend {
    /// Create a backend for the given origin.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Connection` if the HTTP client cannot be built.
    pub fn new(endpoints: Endpoints) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Connection(format!("client setup failed: {e}")))?;
        Ok(Self { http, endpoints })
    }
}

impl ChannelBackend for SseBackend {
    async fn open(&self, user: &UserId) -> Result<ChannelHandle, TransportError> {
        let url = self.endpoints.events(user);
        tracing::debug!(%url, "opening event stream");

        let resp = self
            .http
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Rejected(status.as_u16()));
        }

        let (tx, rx) = mpsc::channel(SIGNAL_BUFFER);
        let handle = tokio::spawn(read_events(resp, tx));

        Ok(ChannelHandle::new(rx, handle.abort_handle()))
    }
}

async fn read_events(resp: reqwest::Response, tx: mpsc::Sender<ChannelSignal>) {
    let mut stream = resp.bytes_stream();
    let mut decoder = SseDecoder::new();

    let reason = loop {
        match stream.next().await {
            Some(Ok(chunk)) => {
                for payload in decoder.feed(&chunk) {
                    if tx.send(ChannelSignal::Payload(payload)).await.is_err() {
                        return;
                    }
                }
            },
            Some(Err(e)) => break format!("stream error: {e}"),
            None => break "stream ended".to_string(),
        }
    };

    for payload in decoder.finish() {
        if tx.send(ChannelSignal::Payload(payload)).await.is_err() {
            return;
        }
    }

    // Receiver gone means the channel was already closed locally
    let _ = tx.send(ChannelSignal::Closed { reason }).await;
}
