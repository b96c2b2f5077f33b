//! Notifier input events.
//!
//! Events originate from three sources:
//! - The session and the hosting UI (identity, active room, commands, clicks).
//! - The live channel, tagged with the [`Generation`] it was opened for.
//! - Completions of REST calls and timers started by earlier actions.

use barter_client::{ApiError, api::StoredMessage};
use barter_core::{RoomId, RoomSummary, UserId};

use crate::{Generation, NotificationId};

/// Events processed by the [`crate::Notifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierEvent {
    /// Identity appeared, changed, or disappeared.
    IdentityChanged(Option<UserId>),

    /// Viewer opened a conversation.
    OpenRoom {
        /// Room now on screen.
        room_id: RoomId,
    },

    /// Viewer left the conversation view.
    CloseRoom,

    /// Viewer submitted a message.
    SendMessage {
        /// Target room.
        room_id: RoomId,
        /// Raw input, trimmed before sending.
        text: String,
    },

    /// Viewer asked to chat with a listing's owner.
    StartChat {
        /// Listing.
        product_id: String,
        /// Listing title.
        product_name: String,
        /// Listing owner.
        seller_id: UserId,
    },

    /// Viewer asked to reconnect after the notifier gave up.
    RetryNow,

    /// Server accepted the subscription.
    ChannelOpened {
        /// Generation passed to the open.
        generation: Generation,
    },

    /// One raw payload arrived.
    Payload {
        /// Generation of the channel that delivered it.
        generation: Generation,
        /// Undecoded payload.
        raw: String,
    },

    /// Channel could not be opened, or closed unexpectedly.
    ChannelFailed {
        /// Generation of the failed channel.
        generation: Generation,
        /// Human-readable cause.
        reason: String,
    },

    /// Backoff timer fired.
    ReconnectDue {
        /// Generation the timer was scheduled for.
        generation: Generation,
    },

    /// Room list fetched.
    RoomsFetched {
        /// Identity the list was fetched for.
        identity: UserId,
        /// Rooms the identity participates in.
        rooms: Vec<RoomSummary>,
    },

    /// Unread aggregate fetched.
    UnreadFetched {
        /// Identity the count was fetched for.
        identity: UserId,
        /// Rooms with unseen messages.
        count: u32,
    },

    /// Ledger refresh failed.
    RefreshFailed {
        /// Identity the refresh was for.
        identity: UserId,
        /// Cause.
        error: ApiError,
    },

    /// Messages of a conversation fetched.
    RoomLoaded {
        /// Viewer the conversation was loaded for.
        identity: UserId,
        /// Room.
        room_id: RoomId,
        /// Messages, oldest first.
        messages: Vec<StoredMessage>,
    },

    /// Conversation could not be loaded.
    RoomLoadFailed {
        /// Room.
        room_id: RoomId,
        /// Cause.
        error: ApiError,
    },

    /// Read marker moved.
    MarkedRead {
        /// Identity whose marker moved.
        identity: UserId,
        /// Room.
        room_id: RoomId,
    },

    /// Read marker could not be moved.
    MarkReadFailed {
        /// Room.
        room_id: RoomId,
        /// Cause.
        error: ApiError,
    },

    /// Message stored by the server.
    MessageSent {
        /// Room.
        room_id: RoomId,
    },

    /// Message was not stored.
    SendFailed {
        /// Room.
        room_id: RoomId,
        /// Cause.
        error: ApiError,
    },

    /// Room for a listing created.
    ChatStarted {
        /// Viewer who started the chat.
        identity: UserId,
        /// Room to navigate to.
        room_id: RoomId,
        /// Listing title, quoted in the opening message.
        product_name: String,
    },

    /// Room for a listing could not be created.
    StartChatFailed {
        /// Cause.
        error: ApiError,
    },

    /// Viewer clicked a notification.
    NotificationClicked {
        /// Notification.
        id: NotificationId,
    },

    /// Viewer dismissed a notification.
    NotificationDismissed {
        /// Notification.
        id: NotificationId,
    },

    /// Display duration of a notification elapsed.
    NotificationExpired {
        /// Notification.
        id: NotificationId,
    },

    /// Component is going away. Nothing reopens after this.
    Teardown,
}
