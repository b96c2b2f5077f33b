//! Production driver.
//!
//! Executes notifier actions with real sockets and timers. Every piece of
//! work is a tokio task whose completion is sent back through one event
//! channel; the runtime is the only consumer.
//!
//! Each long-lived task (channel reader, backoff timer, notification expiry)
//! is tracked by its abort handle and aborted when superseded or on
//! [`LiveDriver::stop`]. Dropping the driver stops everything too.

use std::{collections::HashMap, time::Duration};

use barter_app::{ApiCall, Driver, Generation, Notification, NotificationId, NotifierEvent, Presenter, Router};
use barter_client::{
    Endpoints,
    api::{ApiConfig, ChatApi, CreateRoomRequest, StoredMessage},
    transport::{BackendKind, Channel, ChannelBackend, ChannelSignal},
};
use barter_core::{RoomId, UserId};
use tokio::{
    sync::mpsc,
    task::{AbortHandle, JoinSet},
};

use crate::DriverError;

/// Events buffered between tasks and the runtime.
pub const EVENT_BUFFER: usize = 256;

/// Driver backed by tokio, reqwest, and tungstenite.
pub struct LiveDriver<P, R> {
    api: ChatApi,
    channel: Channel,
    presenter: P,
    router: R,
    events_tx: mpsc::Sender<NotifierEvent>,
    events_rx: mpsc::Receiver<NotifierEvent>,
    channel_task: Option<AbortHandle>,
    reconnect_timer: Option<AbortHandle>,
    expiry_timers: HashMap<NotificationId, AbortHandle>,
    requests: JoinSet<()>,
}

impl<P: Presenter, R: Router> LiveDriver<P, R> {
    /// Create a driver.
    pub fn new(api: ChatApi, channel: Channel, presenter: P, router: R) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        Self {
            api,
            channel,
            presenter,
            router,
            events_tx,
            events_rx,
            channel_task: None,
            reconnect_timer: None,
            expiry_timers: HashMap::new(),
            requests: JoinSet::new(),
        }
    }

    /// Create a driver for the API at `origin`.
    ///
    /// # Errors
    ///
    /// - `DriverError::Endpoint` if `origin` is not an http(s) URL
    /// - `DriverError::Api` or `DriverError::Transport` if an HTTP client
    ///   cannot be built
    pub fn connect(
        origin: &str,
        backend: BackendKind,
        api_config: &ApiConfig,
        presenter: P,
        router: R,
    ) -> Result<Self, DriverError> {
        let endpoints = Endpoints::new(origin)?;
        tracing::info!(origin = %endpoints.origin(), %backend, "configuring live driver");

        let api = ChatApi::new(endpoints.clone(), api_config)?;
        let channel = Channel::new(backend, endpoints)?;
        Ok(Self::new(api, channel, presenter, router))
    }

    /// Sender for host inputs (commands, clicks, teardown).
    pub fn inputs(&self) -> mpsc::Sender<NotifierEvent> {
        self.events_tx.clone()
    }

    fn spawn_request<F>(&mut self, work: F)
    where
        F: Future<Output = NotifierEvent> + Send + 'static,
    {
        // Reap finished requests so the set does not grow unbounded
        while self.requests.try_join_next().is_some() {}

        let tx = self.events_tx.clone();
        self.requests.spawn(async move {
            let event = work.await;
            // Receiver gone means the runtime already exited
            let _ = tx.send(event).await;
        });
    }
}

impl<P: Presenter, R: Router> Driver for LiveDriver<P, R> {
    type Error = DriverError;

    async fn next_event(&mut self) -> Result<Option<NotifierEvent>, DriverError> {
        Ok(self.events_rx.recv().await)
    }

    fn open_channel(&mut self, identity: &UserId, generation: Generation) {
        self.close_channel();

        let channel = self.channel.clone();
        let identity = identity.clone();
        let tx = self.events_tx.clone();

        let task = tokio::spawn(async move {
            let mut handle = match channel.open(&identity).await {
                Ok(handle) => handle,
                Err(e) => {
                    let _ = tx.send(NotifierEvent::ChannelFailed { generation, reason: e.to_string() }).await;
                    return;
                },
            };

            if tx.send(NotifierEvent::ChannelOpened { generation }).await.is_err() {
                return;
            }

            while let Some(signal) = handle.signals.recv().await {
                let event = match signal {
                    ChannelSignal::Payload(raw) => NotifierEvent::Payload { generation, raw },
                    ChannelSignal::Closed { reason } => NotifierEvent::ChannelFailed { generation, reason },
                };
                let closed = matches!(event, NotifierEvent::ChannelFailed { .. });
                if tx.send(event).await.is_err() || closed {
                    return;
                }
            }

            let reason = "reader stopped".to_string();
            let _ = tx.send(NotifierEvent::ChannelFailed { generation, reason }).await;
        });

        tracing::debug!(%generation, backend = %self.channel.kind(), "channel task spawned");
        self.channel_task = Some(task.abort_handle());
    }

    fn close_channel(&mut self) {
        if let Some(task) = self.channel_task.take() {
            tracing::info!("closing live channel");
            task.abort();
        }
    }

    fn schedule_reconnect(&mut self, delay: Duration, generation: Generation) {
        self.cancel_reconnect();

        let tx = self.events_tx.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(NotifierEvent::ReconnectDue { generation }).await;
        });
        self.reconnect_timer = Some(timer.abort_handle());
    }

    fn cancel_reconnect(&mut self) {
        if let Some(timer) = self.reconnect_timer.take() {
            timer.abort();
        }
    }

    fn call(&mut self, call: ApiCall) {
        let api = self.api.clone();

        match call {
            ApiCall::RefreshLedger { identity } => self.spawn_request(async move {
                match api.fetch_rooms(&identity).await {
                    Ok(rooms) => NotifierEvent::RoomsFetched { identity, rooms },
                    Err(rooms_err) if rooms_err.is_transient() => {
                        tracing::debug!(error = %rooms_err, "room list unavailable, trying unread aggregate");
                        match api.fetch_unread(&identity).await {
                            Ok(count) => NotifierEvent::UnreadFetched { identity, count },
                            Err(_) => NotifierEvent::RefreshFailed { identity, error: rooms_err },
                        }
                    },
                    Err(error) => NotifierEvent::RefreshFailed { identity, error },
                }
            }),
            ApiCall::LoadRoom { room_id, identity } => self.spawn_request(async move {
                match api.fetch_messages(&room_id).await {
                    Ok(messages) => NotifierEvent::RoomLoaded { identity, room_id, messages },
                    Err(error) => NotifierEvent::RoomLoadFailed { room_id, error },
                }
            }),
            ApiCall::MarkRead { room_id, identity } => self.spawn_request(async move {
                match api.mark_read(&room_id, &identity).await {
                    Ok(()) => NotifierEvent::MarkedRead { identity, room_id },
                    Err(error) => NotifierEvent::MarkReadFailed { room_id, error },
                }
            }),
            ApiCall::SendMessage { room_id, identity, text } => self.spawn_request(async move {
                match api.send_message(&room_id, &identity, &text).await {
                    Ok(()) => NotifierEvent::MessageSent { room_id },
                    Err(error) => NotifierEvent::SendFailed { room_id, error },
                }
            }),
            ApiCall::CreateRoom { product_id, product_name, buyer_id, seller_id } => {
                self.spawn_request(async move {
                    let identity = buyer_id.clone();
                    let request = CreateRoomRequest { product_id, buyer_id, seller_id };
                    match api.create_room(&request).await {
                        Ok(room_id) => NotifierEvent::ChatStarted { identity, room_id, product_name },
                        Err(error) => NotifierEvent::StartChatFailed { error },
                    }
                });
            },
        }
    }

    fn present(&mut self, notification: &Notification, display_for: Duration) {
        self.presenter.present(notification);

        let id = notification.id;
        let tx = self.events_tx.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(display_for).await;
            let _ = tx.send(NotifierEvent::NotificationExpired { id }).await;
        });

        if let Some(previous) = self.expiry_timers.insert(id, timer.abort_handle()) {
            previous.abort();
        }
    }

    fn dismiss(&mut self, id: NotificationId) {
        if let Some(timer) = self.expiry_timers.remove(&id) {
            timer.abort();
        }
        self.presenter.dismiss(id);
    }

    fn navigate(&mut self, path: &str) {
        self.router.navigate(path);
    }

    fn show_conversation(&mut self, room_id: &RoomId, messages: &[StoredMessage]) {
        self.presenter.conversation(room_id, messages);
    }

    fn show_error(&mut self, message: &str) {
        self.presenter.status(&format!("error: {message}"));
    }

    fn connection_lost(&mut self, attempts: u32) {
        self.presenter.status(&format!("disconnected after {attempts} attempts (type `retry` to reconnect)"));
    }

    fn stop(&mut self) {
        tracing::debug!(requests = self.requests.len(), "stopping driver");
        self.abort_all();
    }
}

impl<P, R> LiveDriver<P, R> {
    fn abort_all(&mut self) {
        if let Some(task) = self.channel_task.take() {
            task.abort();
        }
        if let Some(timer) = self.reconnect_timer.take() {
            timer.abort();
        }
        for (_, timer) in self.expiry_timers.drain() {
            timer.abort();
        }
        self.requests.abort_all();
    }
}

impl<P, R> Drop for LiveDriver<P, R> {
    fn drop(&mut self) {
        self.abort_all();
    }
}
