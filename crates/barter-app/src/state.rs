//! Observable notifier state.
//!
//! These types are the view model of the live channel: enough to render a
//! connection indicator and the notification stack without exposing the
//! reconnection internals.

use std::{fmt, time::Duration};

use barter_core::RoomId;

/// Identifies one channel slot.
///
/// Bumped every time a channel is opened, closed, or replaced. Signals and
/// timers carry the generation they were created for; anything carrying an
/// older generation is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    /// Generation before any channel was opened.
    pub const ZERO: Self = Self(0);

    /// The generation after this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Live channel state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelState {
    /// No identity; nothing to listen to.
    Idle,
    /// Open requested, not yet confirmed.
    Connecting,
    /// Channel confirmed by the server.
    Open,
    /// Waiting to retry after a failure.
    Backoff {
        /// Consecutive failures so far.
        attempt: u32,
        /// Wait before the next open.
        delay: Duration,
    },
    /// Gave up after too many failures. Only a manual retry or an identity
    /// change reopens the channel.
    Disconnected {
        /// Failures before giving up.
        attempts: u32,
    },
}

impl ChannelState {
    /// Whether a channel handle is currently held.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Connecting | Self::Open)
    }
}

/// Identifies a presented notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NotificationId(pub u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A transient alert for a message in another room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Notification id.
    pub id: NotificationId,
    /// Room the message arrived in.
    pub room_id: RoomId,
    /// Text to show, `"Name: body"` when the sender is known.
    pub text: String,
}

impl Notification {
    /// Where a click on this notification leads.
    pub fn target(&self) -> String {
        self.room_id.chat_path()
    }
}
