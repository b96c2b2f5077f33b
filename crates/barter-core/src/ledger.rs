//! Unread ledger.
//!
//! Tracks which conversations hold messages the viewer has not seen. Every
//! room carries two read markers, one per participant role; only the viewer's
//! own marker is consulted.
//!
//! The ledger is a cache of authoritative server state. [`UnreadLedger::apply_rooms`]
//! replaces it wholesale (last write wins), and optimistic updates from live
//! events are overwritten by the next refresh. A failed refresh keeps the
//! previous value rather than flickering to zero.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{RoomId, UserId};

/// Participant role within a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Started the conversation about the listing.
    Buyer,
    /// Owns the listing.
    Seller,
}

/// Conversation summary as returned by `GET /chat/rooms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    /// Room id.
    pub id: RoomId,
    /// Listing the conversation is about.
    #[serde(default)]
    pub product_id: Option<String>,
    /// Buyer participant.
    pub buyer_id: UserId,
    /// Seller participant.
    pub seller_id: UserId,
    /// Body of the latest message.
    #[serde(default)]
    pub last_message: Option<String>,
    /// Time of the latest message. `None` if the room is empty.
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    /// Buyer's read marker.
    #[serde(default)]
    pub buyer_read_at: Option<DateTime<Utc>>,
    /// Seller's read marker.
    #[serde(default)]
    pub seller_read_at: Option<DateTime<Utc>>,
    /// Last modification of the room row.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RoomSummary {
    /// Role `viewer` plays in this room. `None` if not a participant.
    pub fn role_of(&self, viewer: &UserId) -> Option<Role> {
        if &self.buyer_id == viewer {
            Some(Role::Buyer)
        } else if &self.seller_id == viewer {
            Some(Role::Seller)
        } else {
            None
        }
    }

    /// Read marker for a role.
    pub fn read_marker(&self, role: Role) -> Option<DateTime<Utc>> {
        match role {
            Role::Buyer => self.buyer_read_at,
            Role::Seller => self.seller_read_at,
        }
    }

    /// Whether the room holds messages `viewer` has not read.
    ///
    /// Empty rooms are never unread. A room with messages but no read marker
    /// for the viewer is unread. Otherwise the latest message must be strictly
    /// newer than the viewer's own marker.
    pub fn is_unread_for(&self, viewer: &UserId) -> bool {
        let Some(role) = self.role_of(viewer) else {
            return false;
        };
        let Some(last_message_at) = self.last_message_at else {
            return false;
        };

        match self.read_marker(role) {
            Some(read_at) => last_message_at > read_at,
            None => true,
        }
    }
}

/// Count of rooms with unseen messages for the current viewer.
#[derive(Debug, Clone, Default)]
pub struct UnreadLedger {
    viewer: Option<UserId>,
    rooms: Vec<RoomSummary>,
    unread: BTreeSet<RoomId>,
    count: u32,
}

impl UnreadLedger {
    /// Empty ledger with no viewer. Count is 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all state and start tracking `viewer`.
    ///
    /// Called on every identity change so one user's counts never leak into
    /// another's.
    pub fn reset(&mut self, viewer: Option<UserId>) {
        self.viewer = viewer;
        self.rooms.clear();
        self.unread.clear();
        self.count = 0;
    }

    /// Number of rooms with unseen messages. Always 0 without a viewer.
    pub fn count(&self) -> u32 {
        if self.viewer.is_none() { 0 } else { self.count }
    }

    /// Whether `room_id` is known to hold unseen messages.
    pub fn is_unread(&self, room_id: &RoomId) -> bool {
        self.unread.contains(room_id)
    }

    /// Rooms from the last successful room-list refresh.
    pub fn rooms(&self) -> &[RoomSummary] {
        &self.rooms
    }

    /// Replace state with a fresh room list.
    ///
    /// Returns `false` (and changes nothing) if the list was fetched for a
    /// different viewer than the one currently tracked.
    pub fn apply_rooms(&mut self, viewer: &UserId, rooms: Vec<RoomSummary>) -> bool {
        if self.viewer.as_ref() != Some(viewer) {
            tracing::debug!(%viewer, "discarding room list for previous identity");
            return false;
        }

        self.unread =
            rooms.iter().filter(|room| room.is_unread_for(viewer)).map(|room| room.id.clone()).collect();
        self.count = self.unread.len() as u32;
        self.rooms = rooms;
        true
    }

    /// Replace the count with the server's aggregate.
    ///
    /// Used when only `GET /chat/unread` is available; per-room flags are left
    /// as they were.
    pub fn apply_count(&mut self, viewer: &UserId, count: u32) -> bool {
        if self.viewer.as_ref() != Some(viewer) {
            tracing::debug!(%viewer, "discarding unread count for previous identity");
            return false;
        }

        self.count = count;
        true
    }

    /// Optimistically flag a room after a live message arrives elsewhere.
    ///
    /// Returns `true` if the count changed.
    pub fn note_incoming(&mut self, room_id: &RoomId) -> bool {
        if self.viewer.is_none() || !self.unread.insert(room_id.clone()) {
            return false;
        }

        self.count = self.count.saturating_add(1);
        true
    }

    /// Optimistically clear a room after the viewer reads it.
    ///
    /// Returns `true` if the count changed.
    pub fn note_read(&mut self, room_id: &RoomId) -> bool {
        if !self.unread.remove(room_id) {
            return false;
        }

        self.count = self.count.saturating_sub(1);
        true
    }
}
