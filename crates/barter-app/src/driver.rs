//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the notification runtime from specific I/O
//! implementations. Production drives real sockets and timers; tests script
//! events in memory. The generic [`crate::Runtime`] handles all orchestration.

use std::{future::Future, time::Duration};

use barter_client::api::StoredMessage;
use barter_core::{RoomId, UserId};

use crate::{ApiCall, Generation, Notification, NotificationId, NotifierEvent};

/// Abstracts I/O operations for the notification runtime.
///
/// Every operation except [`Driver::next_event`] starts work and returns at
/// once; results come back later as events. Nothing here may block.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next completion or input.
    ///
    /// Returns `None` when no more events will ever arrive. Must be cancel
    /// safe: the runtime races it against session changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver's event source failed irrecoverably.
    fn next_event(&mut self) -> impl Future<Output = Result<Option<NotifierEvent>, Self::Error>> + Send;

    /// Open the live channel for `identity`.
    ///
    /// Reports `ChannelOpened`, then `Payload`s, and finally `ChannelFailed`,
    /// all tagged with `generation`.
    fn open_channel(&mut self, identity: &UserId, generation: Generation);

    /// Close the live channel. Undelivered signals are dropped. Idempotent.
    fn close_channel(&mut self);

    /// Fire `ReconnectDue { generation }` after `delay`.
    fn schedule_reconnect(&mut self, delay: Duration, generation: Generation);

    /// Abort the pending reconnect timer, if any. Idempotent.
    fn cancel_reconnect(&mut self);

    /// Start a REST call.
    fn call(&mut self, call: ApiCall);

    /// Show a notification; fire `NotificationExpired` after `display_for`.
    fn present(&mut self, notification: &Notification, display_for: Duration);

    /// Remove a notification and abort its expiry timer.
    fn dismiss(&mut self, id: NotificationId);

    /// Forward a navigation request to the host router.
    fn navigate(&mut self, path: &str);

    /// Render the conversation on screen.
    fn show_conversation(&mut self, room_id: &RoomId, messages: &[StoredMessage]);

    /// Surface a transient error.
    fn show_error(&mut self, message: &str);

    /// Surface that the live channel is down for good.
    fn connection_lost(&mut self, attempts: u32);

    /// Stop all tasks and timers.
    fn stop(&mut self);
}

/// Receives notifications to show.
///
/// The host UI implements this. Calls must not block.
pub trait Presenter: Send {
    /// Show a notification.
    fn present(&mut self, notification: &Notification);

    /// Remove a notification.
    fn dismiss(&mut self, id: NotificationId);

    /// Show a status line (errors, connection loss).
    fn status(&mut self, line: &str);

    /// Show the conversation on screen. Optional.
    fn conversation(&mut self, _room_id: &RoomId, _messages: &[StoredMessage]) {}
}

/// Receives navigation requests.
pub trait Router: Send {
    /// Navigate to `path`, e.g. `/chats/<room_id>`.
    fn navigate(&mut self, path: &str);
}
