//! Notifier side-effects.
//!
//! This module defines [`NotifierAction`], the instructions produced by the
//! [`crate::Notifier`] for a driver to execute. Completions come back as
//! [`crate::NotifierEvent`]s.

use std::time::Duration;

use barter_client::api::StoredMessage;
use barter_core::{RoomId, UserId};

use crate::{Generation, Notification, NotificationId};

/// Actions produced by the Notifier state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierAction {
    /// Open the live channel. Any previous channel has already been closed.
    OpenChannel {
        /// Identity the channel is scoped to.
        identity: UserId,
        /// Tag for every signal from this channel.
        generation: Generation,
    },

    /// Close the live channel, if any. Idempotent.
    CloseChannel,

    /// Start the backoff timer. Fires [`crate::NotifierEvent::ReconnectDue`].
    ScheduleReconnect {
        /// Wait before firing.
        delay: Duration,
        /// Generation to report when firing.
        generation: Generation,
    },

    /// Abort the backoff timer, if any. Idempotent.
    CancelReconnect,

    /// Perform a REST call.
    Api(ApiCall),

    /// Show a notification and start its display timer.
    Present {
        /// What to show.
        notification: Notification,
        /// Display duration.
        display_for: Duration,
    },

    /// Remove a notification and abort its display timer.
    Dismiss {
        /// Notification.
        id: NotificationId,
    },

    /// Ask the host router to navigate.
    Navigate {
        /// Route path.
        path: String,
    },

    /// Render the messages of the conversation on screen.
    ShowConversation {
        /// Room on screen.
        room_id: RoomId,
        /// Messages, oldest first.
        messages: Vec<StoredMessage>,
    },

    /// Surface a transient error to the viewer.
    ShowError {
        /// User-facing text.
        message: String,
    },

    /// The notifier gave up reconnecting. Emitted once per outage.
    ConnectionLost {
        /// Failures before giving up.
        attempts: u32,
    },
}

/// REST calls the notifier asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// Recompute the unread ledger from the server.
    RefreshLedger {
        /// Viewer.
        identity: UserId,
    },

    /// Reload a conversation's messages.
    LoadRoom {
        /// Room.
        room_id: RoomId,
        /// Viewer the conversation is loaded for.
        identity: UserId,
    },

    /// Move the viewer's read marker to now.
    MarkRead {
        /// Room.
        room_id: RoomId,
        /// Viewer.
        identity: UserId,
    },

    /// Post a message.
    SendMessage {
        /// Room.
        room_id: RoomId,
        /// Author.
        identity: UserId,
        /// Trimmed text.
        text: String,
    },

    /// Create or look up the room for a listing.
    CreateRoom {
        /// Listing.
        product_id: String,
        /// Listing title, quoted in the opening message.
        product_name: String,
        /// Viewer.
        buyer_id: UserId,
        /// Listing owner.
        seller_id: UserId,
    },
}
