//! Event dispatcher.
//!
//! Classifies each [`InboundEvent`] and decides what should happen. The
//! dispatcher is stateless across events apart from two references it is
//! handed: the viewer, and the room the viewer currently has open.
//!
//! | Event | Active room? | Result |
//! |---|---|---|
//! | `heartbeat` | - | `Healthy` |
//! | `connected` | - | `Healthy` |
//! | `new_message` | same room | `RefreshRoom`, `Healthy` |
//! | `new_message` | other room | `Notify`, `RefreshLedger`, `Healthy` |
//!
//! Messages the server echoes back from the viewer never notify.

use crate::{ChatMessage, InboundEvent, RoomId, UserId};

/// Routing decision for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The channel delivered a usable event; reset reconnection backoff.
    Healthy,

    /// Silently reload the open conversation.
    RefreshRoom {
        /// Room the viewer is looking at.
        room_id: RoomId,
    },

    /// Show a notification for a message in another room.
    Notify {
        /// Room the message arrived in.
        room_id: RoomId,
        /// The message.
        message: ChatMessage,
    },

    /// Recompute unread counts from the server.
    RefreshLedger {
        /// Room that triggered the refresh.
        room_id: RoomId,
    },
}

/// Routes inbound events to silent refresh or visible notification.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    viewer: Option<UserId>,
    active_room: Option<RoomId>,
}

impl Dispatcher {
    /// Dispatcher with no viewer and no open room.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the viewer used to recognize echoed messages.
    pub fn set_viewer(&mut self, viewer: Option<UserId>) {
        self.viewer = viewer;
    }

    /// Set the room the viewer has open. `None` when no conversation is shown.
    pub fn set_active_room(&mut self, room_id: Option<RoomId>) {
        self.active_room = room_id;
    }

    /// Room the viewer has open.
    pub fn active_room(&self) -> Option<&RoomId> {
        self.active_room.as_ref()
    }

    /// Decide what to do with one event.
    pub fn dispatch(&self, event: InboundEvent) -> Vec<Dispatch> {
        match event {
            InboundEvent::Heartbeat | InboundEvent::Connected => vec![Dispatch::Healthy],
            InboundEvent::NewMessage { room_id, message } => {
                let is_active = self.active_room.as_ref() == Some(&room_id);
                let is_echo =
                    message.sender_id.is_some() && message.sender_id.as_ref() == self.viewer.as_ref();

                if is_active {
                    vec![Dispatch::RefreshRoom { room_id }, Dispatch::Healthy]
                } else if is_echo {
                    tracing::debug!(%room_id, "ignoring echo of own message");
                    vec![Dispatch::Healthy]
                } else {
                    vec![
                        Dispatch::Notify { room_id: room_id.clone(), message },
                        Dispatch::RefreshLedger { room_id },
                        Dispatch::Healthy,
                    ]
                }
            },
        }
    }
}
