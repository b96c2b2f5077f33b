//! Line-oriented terminal surfaces.
//!
//! Notifications are printed as they arrive and stay on screen; dismissals
//! and expiries are only logged.

use std::io::Write;

use barter_app::{Notification, NotificationId, NotifierEvent, Presenter, Router};
use barter_client::api::StoredMessage;
use barter_core::RoomId;
use tokio::sync::mpsc;

/// Writes notifications and status lines to a terminal.
#[derive(Debug)]
pub struct TerminalPresenter<W> {
    out: W,
}

impl<W: Write + Send> TerminalPresenter<W> {
    /// Presenter writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// The underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "terminal write failed");
        }
    }
}

impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    fn present(&mut self, notification: &Notification) {
        let line = format!(
            "[{}] {}  (room {}, `click {}` to open)",
            notification.id, notification.text, notification.room_id, notification.id.0
        );
        self.line(&line);
    }

    fn dismiss(&mut self, id: NotificationId) {
        tracing::debug!(%id, "notification dismissed");
    }

    fn status(&mut self, line: &str) {
        self.line(&format!("! {line}"));
    }

    fn conversation(&mut self, room_id: &RoomId, messages: &[StoredMessage]) {
        self.line(&format!("--- {room_id} ({} messages)", messages.len()));
        for message in messages {
            let line = format!("{}: {}", message.sender_id, message.message);
            self.line(&line);
        }
    }
}

/// Treats navigation to a conversation as opening it.
#[derive(Debug, Clone)]
pub struct TerminalRouter {
    inputs: mpsc::Sender<NotifierEvent>,
}

impl TerminalRouter {
    /// Router feeding `OpenRoom` back into the notifier.
    pub fn new(inputs: mpsc::Sender<NotifierEvent>) -> Self {
        Self { inputs }
    }
}

impl Router for TerminalRouter {
    fn navigate(&mut self, path: &str) {
        let Some(room) = path.strip_prefix("/chats/").filter(|room| !room.is_empty()) else {
            tracing::warn!(path, "navigation outside the chat view ignored");
            return;
        };

        if let Err(e) = self.inputs.try_send(NotifierEvent::OpenRoom { room_id: RoomId::new(room) }) {
            tracing::warn!(path, error = %e, "navigation dropped");
        }
    }
}
