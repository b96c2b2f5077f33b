//! WebSocket backend.

use barter_core::UserId;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

use super::{ChannelBackend, ChannelHandle, ChannelSignal, SIGNAL_BUFFER};
use crate::{Endpoints, TransportError};

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Opens `/chat/subscribe` WebSocket subscriptions.
#[derive(Debug, Clone)]
pub struct WebSocketBackend {
    endpoints: Endpoints,
}

impl WebSocketBackend {
    /// Create a backend for the given origin.
    pub fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }
}

impl ChannelBackend for WebSocketBackend {
    async fn open(&self, user: &UserId) -> Result<ChannelHandle, TransportError> {
        let url = self.endpoints.subscribe(user)?;
        tracing::debug!(%url, "opening websocket subscription");

        let (socket, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let (tx, rx) = mpsc::channel(SIGNAL_BUFFER);
        let handle = tokio::spawn(read_frames(socket, tx));

        Ok(ChannelHandle::new(rx, handle.abort_handle()))
    }
}

async fn read_frames(mut socket: Socket, tx: mpsc::Sender<ChannelSignal>) {
    let reason = loop {
        let payload = match socket.next().await {
            Some(Ok(Message::Text(text))) => text.to_string(),
            Some(Ok(Message::Binary(data))) => String::from_utf8_lossy(&data).into_owned(),
            Some(Ok(Message::Close(frame))) => {
                break frame
                    .map(|f| format!("closed by server: {}", f.reason))
                    .unwrap_or_else(|| "closed by server".to_string());
            },
            // Pings are answered by tungstenite on the next read
            Some(Ok(_)) => continue,
            Some(Err(e)) => break format!("socket error: {e}"),
            None => break "socket ended".to_string(),
        };

        if tx.send(ChannelSignal::Payload(payload)).await.is_err() {
            return;
        }
    };

    let _ = tx.send(ChannelSignal::Closed { reason }).await;
}
