//! Property-based tests for the unread ledger and dispatcher.

use barter_core::{
    ChatMessage, Dispatch, Dispatcher, InboundEvent, RoomId, RoomSummary, UnreadLedger, UserId,
};
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

const VIEWER: &str = "viewer";

fn at(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

#[derive(Debug, Clone)]
enum LedgerOp {
    Incoming(u8),
    Read(u8),
    Rooms(Vec<(u8, Option<i64>, Option<i64>, bool)>),
    Count(u32),
    SignOut,
    SignIn,
}

fn op_strategy() -> impl Strategy<Value = LedgerOp> {
    let row = (0u8..6, prop::option::of(0i64..1000), prop::option::of(0i64..1000), any::<bool>());
    prop_oneof![
        3 => (0u8..6).prop_map(LedgerOp::Incoming),
        2 => (0u8..6).prop_map(LedgerOp::Read),
        2 => prop::collection::vec(row, 0..6).prop_map(LedgerOp::Rooms),
        1 => (0u32..20).prop_map(LedgerOp::Count),
        1 => Just(LedgerOp::SignOut),
        1 => Just(LedgerOp::SignIn),
    ]
}

fn summary(room: u8, last: Option<i64>, read: Option<i64>, viewer_is_buyer: bool) -> RoomSummary {
    let (buyer, seller) = if viewer_is_buyer { (VIEWER, "partner") } else { ("partner", VIEWER) };
    let (buyer_read, seller_read) = if viewer_is_buyer { (read, None) } else { (None, read) };

    RoomSummary {
        id: RoomId::new(format!("room-{room}")),
        product_id: None,
        buyer_id: UserId::new(buyer),
        seller_id: UserId::new(seller),
        last_message: None,
        last_message_at: last.and_then(at),
        buyer_read_at: buyer_read.and_then(at),
        seller_read_at: seller_read.and_then(at),
        updated_at: None,
    }
}

proptest! {
    #[test]
    fn prop_count_zero_without_viewer(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let viewer = UserId::new(VIEWER);
        let mut ledger = UnreadLedger::new();
        let mut signed_in = false;

        for op in ops {
            match op {
                LedgerOp::Incoming(room) => { ledger.note_incoming(&RoomId::new(format!("room-{room}"))); },
                LedgerOp::Read(room) => { ledger.note_read(&RoomId::new(format!("room-{room}"))); },
                LedgerOp::Rooms(rows) => {
                    let rooms = rows.into_iter().map(|(r, l, m, b)| summary(r, l, m, b)).collect();
                    ledger.apply_rooms(&viewer, rooms);
                },
                LedgerOp::Count(count) => { ledger.apply_count(&viewer, count); },
                LedgerOp::SignOut => {
                    ledger.reset(None);
                    signed_in = false;
                },
                LedgerOp::SignIn => {
                    ledger.reset(Some(viewer.clone()));
                    signed_in = true;
                },
            }

            if !signed_in {
                prop_assert_eq!(ledger.count(), 0);
            }
        }
    }

    #[test]
    fn prop_room_list_count_matches_flags(
        rows in prop::collection::vec(
            (0u8..8, prop::option::of(0i64..1000), prop::option::of(0i64..1000), any::<bool>()),
            0..8,
        ),
    ) {
        let viewer = UserId::new(VIEWER);
        let mut ledger = UnreadLedger::new();
        ledger.reset(Some(viewer.clone()));

        let rooms: Vec<_> = rows.into_iter().map(|(r, l, m, b)| summary(r, l, m, b)).collect();
        let flagged = rooms
            .iter()
            .filter(|room| room.is_unread_for(&viewer))
            .map(|room| room.id.clone())
            .collect::<std::collections::BTreeSet<_>>();

        ledger.apply_rooms(&viewer, rooms);

        prop_assert_eq!(ledger.count() as usize, flagged.len());
        for room in &flagged {
            prop_assert!(ledger.is_unread(room));
        }
    }

    #[test]
    fn prop_active_room_never_notifies(active in 0u8..4, target in 0u8..4) {
        let mut dispatcher = Dispatcher::new();
        dispatcher.set_active_room(Some(RoomId::new(format!("room-{active}"))));

        let event = InboundEvent::NewMessage {
            room_id: RoomId::new(format!("room-{target}")),
            message: ChatMessage::text("offer"),
        };
        let result = dispatcher.dispatch(event);

        let notifies = result.iter().filter(|d| matches!(d, Dispatch::Notify { .. })).count();
        let refreshes = result.iter().filter(|d| matches!(d, Dispatch::RefreshLedger { .. })).count();

        if active == target {
            prop_assert_eq!(notifies, 0);
            prop_assert_eq!(refreshes, 0);
        } else {
            prop_assert_eq!(notifies, 1);
            prop_assert_eq!(refreshes, 1);
        }
        prop_assert!(result.contains(&Dispatch::Healthy));
    }
}
