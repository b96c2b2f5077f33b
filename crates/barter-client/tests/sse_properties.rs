//! Property-based tests for the event stream decoder.

use barter_client::SseDecoder;
use proptest::prelude::*;

fn frame(payload: &str) -> String {
    format!("data: {payload}\n\n")
}

fn payload_strategy() -> impl Strategy<Value = String> {
    // Body text may hold any non-newline character, including multi-byte ones
    "[^\n\r]{0,40}".prop_map(|text| format!(r#"{{"type":"new_message","room_id":"r","message":"{text}"}}"#))
}

proptest! {
    #[test]
    fn chunk_boundaries_do_not_change_payloads(
        payloads in prop::collection::vec(payload_strategy(), 1..8),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..16),
    ) {
        let body: String = payloads.iter().map(|p| frame(p)).collect();
        let bytes = body.as_bytes();

        let mut offsets: Vec<usize> = cuts.iter().map(|i| i.index(bytes.len() + 1)).collect();
        offsets.push(0);
        offsets.push(bytes.len());
        offsets.sort_unstable();
        offsets.dedup();

        let mut decoder = SseDecoder::new();
        let mut decoded = Vec::new();
        for pair in offsets.windows(2) {
            decoded.extend(decoder.feed(&bytes[pair[0]..pair[1]]));
        }
        decoded.extend(decoder.finish());

        prop_assert_eq!(decoded, payloads);
    }

    #[test]
    fn comments_never_produce_payloads(comments in prop::collection::vec("[^\n]{0,30}", 0..10)) {
        let body: String = comments.iter().map(|c| format!(":{c}\n\n")).collect();

        let mut decoder = SseDecoder::new();
        let mut decoded = decoder.feed(body.as_bytes());
        decoded.extend(decoder.finish());

        prop_assert!(decoded.is_empty());
    }
}
