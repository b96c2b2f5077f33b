//! Property-based tests for the Notifier state machine.
//!
//! Tests verify that channel and ledger invariants hold under arbitrary
//! sequences of channel signals, timers, and viewer actions.

use barter_app::{ChannelState, Generation, Notifier, NotifierAction, NotifierConfig, NotifierEvent};
use barter_core::{ReconnectPolicy, RoomId, UserId};
use proptest::prelude::*;

/// One step applied to a notifier, tagged with the current generation at
/// apply time.
#[derive(Debug, Clone)]
enum Op {
    Heartbeat,
    Connected,
    Unknown,
    Malformed,
    Message(u8),
    Opened,
    Fail,
    ReconnectDue,
    OpenRoom(u8),
    CloseRoom,
    RetryNow,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Heartbeat),
        1 => Just(Op::Connected),
        1 => Just(Op::Unknown),
        1 => Just(Op::Malformed),
        3 => (0u8..4).prop_map(Op::Message),
        2 => Just(Op::Opened),
        3 => Just(Op::Fail),
        3 => Just(Op::ReconnectDue),
        1 => (0u8..4).prop_map(Op::OpenRoom),
        1 => Just(Op::CloseRoom),
        1 => Just(Op::RetryNow),
    ]
}

fn room(n: u8) -> RoomId {
    RoomId::new(format!("r-{n}"))
}

fn payload(generation: Generation, raw: String) -> NotifierEvent {
    NotifierEvent::Payload { generation, raw }
}

fn event_for(op: &Op, generation: Generation) -> NotifierEvent {
    match op {
        Op::Heartbeat => payload(generation, r#"{"type":"heartbeat"}"#.into()),
        Op::Connected => payload(generation, r#"{"type":"connected"}"#.into()),
        Op::Unknown => payload(generation, r#"{"type":"typing","room_id":"r-0"}"#.into()),
        Op::Malformed => payload(generation, "{\"type\":".into()),
        Op::Message(n) => payload(
            generation,
            format!(r#"{{"type":"new_message","room_id":"r-{n}","message":"hello"}}"#),
        ),
        Op::Opened => NotifierEvent::ChannelOpened { generation },
        Op::Fail => NotifierEvent::ChannelFailed { generation, reason: "reset".into() },
        Op::ReconnectDue => NotifierEvent::ReconnectDue { generation },
        Op::OpenRoom(n) => NotifierEvent::OpenRoom { room_id: room(*n) },
        Op::CloseRoom => NotifierEvent::CloseRoom,
        Op::RetryNow => NotifierEvent::RetryNow,
    }
}

fn is_payload(op: &Op) -> bool {
    matches!(op, Op::Heartbeat | Op::Connected | Op::Unknown | Op::Malformed | Op::Message(_))
}

fn signed_in() -> Notifier {
    let mut notifier = Notifier::new(NotifierConfig::default());
    let _ = notifier.handle(NotifierEvent::IdentityChanged(Some(UserId::new("viewer"))));
    notifier
}

fn opens(actions: &[NotifierAction]) -> usize {
    actions.iter().filter(|a| matches!(a, NotifierAction::OpenChannel { .. })).count()
}

proptest! {
    #[test]
    fn prop_payloads_never_increase_attempts(ops in prop::collection::vec(op_strategy(), 0..80)) {
        let mut notifier = signed_in();

        for op in &ops {
            let before = notifier.attempt_count();
            let live = notifier.channel_state().is_live();
            let _ = notifier.handle(event_for(op, notifier.generation()));
            let after = notifier.attempt_count();

            if is_payload(op) {
                prop_assert!(after <= before);
            }
            if live && matches!(op, Op::Heartbeat | Op::Connected | Op::Message(_)) {
                prop_assert_eq!(after, 0);
            }
            if matches!(op, Op::Unknown | Op::Malformed) {
                prop_assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn prop_attempts_follow_consecutive_failures(failures in 1u32..=5) {
        let mut notifier = signed_in();
        let policy = ReconnectPolicy::new(notifier.config().reconnect.clone());

        for n in 1..=failures {
            let actions = notifier.handle(event_for(&Op::Fail, notifier.generation()));
            let scheduled = actions.iter().find_map(|a| match a {
                NotifierAction::ScheduleReconnect { delay, .. } => Some(*delay),
                _ => None,
            });

            prop_assert_eq!(scheduled, Some(policy.backoff_delay(n)));
            prop_assert_eq!(notifier.attempt_count(), n);

            let actions = notifier.handle(event_for(&Op::ReconnectDue, notifier.generation()));
            prop_assert_eq!(opens(&actions), 1);
        }

        let _ = notifier.handle(event_for(&Op::Heartbeat, notifier.generation()));
        prop_assert_eq!(notifier.attempt_count(), 0);
    }

    #[test]
    fn prop_teardown_prevents_reopen(
        failures in 1usize..8,
        late in prop::collection::vec(op_strategy(), 0..20),
    ) {
        let mut notifier = signed_in();
        for _ in 0..failures {
            let _ = notifier.handle(event_for(&Op::Fail, notifier.generation()));
            if failures > 1 {
                let _ = notifier.handle(event_for(&Op::ReconnectDue, notifier.generation()));
            }
        }
        let before = notifier.generation();

        let actions = notifier.handle(NotifierEvent::Teardown);
        prop_assert_eq!(opens(&actions), 0);

        for op in &late {
            for generation in [before, notifier.generation()] {
                let actions = notifier.handle(event_for(op, generation));
                prop_assert_eq!(opens(&actions), 0);
            }
        }
        prop_assert_eq!(notifier.channel_state(), &ChannelState::Idle);
    }

    #[test]
    fn prop_stale_generation_changes_nothing(
        setup in prop::collection::vec(op_strategy(), 0..40),
        stale in prop::collection::vec(op_strategy(), 1..20),
    ) {
        let mut notifier = signed_in();
        for op in &setup {
            let _ = notifier.handle(event_for(op, notifier.generation()));
        }

        let old = Generation::ZERO;
        let state = notifier.channel_state().clone();
        let attempts = notifier.attempt_count();
        let unread = notifier.unread_count();
        let visible = notifier.notifications().count();

        for op in stale.iter().filter(|op| matches!(op, Op::Opened | Op::Fail | Op::ReconnectDue) || is_payload(op)) {
            let actions = notifier.handle(event_for(op, old));
            prop_assert!(actions.is_empty());
        }

        prop_assert_eq!(notifier.channel_state(), &state);
        prop_assert_eq!(notifier.attempt_count(), attempts);
        prop_assert_eq!(notifier.unread_count(), unread);
        prop_assert_eq!(notifier.notifications().count(), visible);
    }

    #[test]
    fn prop_message_elsewhere_notifies_exactly_once(target in 0u8..4, active in prop::option::of(0u8..4)) {
        let mut notifier = signed_in();
        let _ = notifier.handle(event_for(&Op::Opened, notifier.generation()));
        if let Some(n) = active {
            let _ = notifier.handle(event_for(&Op::OpenRoom(n), notifier.generation()));
        }

        let actions = notifier.handle(event_for(&Op::Message(target), notifier.generation()));
        let presented = actions.iter().filter(|a| matches!(a, NotifierAction::Present { .. })).count();

        if active == Some(target) {
            prop_assert_eq!(presented, 0);
        } else {
            prop_assert_eq!(presented, 1);
            prop_assert!(notifier.unread_count() >= 1);
            prop_assert!(notifier.ledger().is_unread(&room(target)));
        }
    }

    #[test]
    fn prop_signed_out_stays_inert(ops in prop::collection::vec(op_strategy(), 0..50)) {
        let mut notifier = Notifier::new(NotifierConfig::default());

        for op in &ops {
            let actions = notifier.handle(event_for(op, notifier.generation()));
            prop_assert_eq!(opens(&actions), 0);
            prop_assert_eq!(notifier.unread_count(), 0);
        }
        prop_assert_eq!(notifier.channel_state(), &ChannelState::Idle);
    }
}
