//! Live channel against local peers.

#![cfg(feature = "transport")]

use std::time::Duration;

use barter_client::{
    Endpoints, TransportError,
    transport::{BackendKind, Channel, ChannelBackend, ChannelSignal},
};
use barter_core::UserId;
use futures::SinkExt;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};
use tokio_tungstenite::tungstenite::Message;

const WAIT: Duration = Duration::from_secs(5);

/// Accept one HTTP request, write `response`, then close.
async fn serve_once(response: &'static str) -> (Endpoints, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let origin = format!("http://{}", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });

    (Endpoints::new(&origin).unwrap(), server)
}

async fn next_signal(handle: &mut barter_client::transport::ChannelHandle) -> ChannelSignal {
    tokio::time::timeout(WAIT, handle.signals.recv()).await.unwrap().unwrap()
}

#[tokio::test]
async fn sse_delivers_payloads_then_closes() {
    let (endpoints, server) = serve_once(concat!(
        "HTTP/1.1 200 OK\r\n",
        "Content-Type: text/event-stream\r\n",
        "Connection: close\r\n",
        "\r\n",
        ": keep-alive\n\n",
        "data: {\"type\":\"connected\"}\n\n",
        "data: {\"type\":\"new_message\",\"room_id\":\"r-1\",\"message\":\"hi\"}\n\n",
    ))
    .await;

    let channel = Channel::new(BackendKind::Sse, endpoints).unwrap();
    let mut handle = channel.open(&UserId::new("u-1")).await.unwrap();

    assert_eq!(next_signal(&mut handle).await, ChannelSignal::Payload(r#"{"type":"connected"}"#.into()));
    let ChannelSignal::Payload(message) = next_signal(&mut handle).await else {
        panic!("expected payload");
    };
    assert!(message.contains("new_message"));
    assert!(matches!(next_signal(&mut handle).await, ChannelSignal::Closed { .. }));

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /chat/events?user_id=u-1 "));
    assert!(request.to_ascii_lowercase().contains("accept: text/event-stream"));
}

#[tokio::test]
async fn sse_rejection_reports_status() {
    let (endpoints, _server) =
        serve_once("HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").await;

    let channel = Channel::new(BackendKind::Sse, endpoints).unwrap();
    let err = channel.open(&UserId::new("u-1")).await.unwrap_err();

    assert_eq!(err, TransportError::Rejected(503));
}

#[tokio::test]
async fn unreachable_origin_is_a_connection_error() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let origin = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let channel = Channel::new(BackendKind::Sse, Endpoints::new(&origin).unwrap()).unwrap();
    let err = channel.open(&UserId::new("u-1")).await.unwrap_err();

    assert!(matches!(err, TransportError::Connection(_)));
}

#[tokio::test]
async fn websocket_delivers_text_frames() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let origin = format!("http://{}", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::Text(r#"{"type":"heartbeat"}"#.into())).await.unwrap();
        ws.close(None).await.unwrap();
    });

    let channel = Channel::new(BackendKind::WebSocket, Endpoints::new(&origin).unwrap()).unwrap();
    let mut handle = channel.open(&UserId::new("u-1")).await.unwrap();

    assert_eq!(next_signal(&mut handle).await, ChannelSignal::Payload(r#"{"type":"heartbeat"}"#.into()));
    assert!(matches!(next_signal(&mut handle).await, ChannelSignal::Closed { .. }));

    server.await.unwrap();
}

#[tokio::test]
async fn stopping_twice_ends_the_reader() {
    let (endpoints, _server) = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\n\r\ndata: {\"type\":\"connected\"}\n\n",
    )
    .await;

    let channel = Channel::new(BackendKind::Sse, endpoints).unwrap();
    let mut handle = channel.open(&UserId::new("u-1")).await.unwrap();
    handle.stop();
    handle.stop();

    // Whatever was buffered may still arrive; after that the sender is gone
    let drained = tokio::time::timeout(WAIT, async {
        while handle.signals.recv().await.is_some() {}
    })
    .await;
    assert!(drained.is_ok());
}
