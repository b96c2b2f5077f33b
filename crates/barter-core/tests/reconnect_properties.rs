//! Property-based tests for the reconnection policy.
//!
//! Verifies backoff shape and give-up behavior for arbitrary configurations
//! and failure/success sequences.

use std::time::Duration;

use barter_core::{ReconnectConfig, ReconnectDecision, ReconnectPolicy};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Failure,
    Success,
}

fn config_strategy() -> impl Strategy<Value = ReconnectConfig> {
    (0u32..10, 1u64..5_000, 1u64..120_000).prop_map(|(max_attempts, base_ms, ceiling_ms)| {
        ReconnectConfig {
            max_attempts,
            base_delay: Duration::from_millis(base_ms),
            delay_ceiling: Duration::from_millis(ceiling_ms),
        }
    })
}

fn outcome_strategy() -> impl Strategy<Value = Outcome> {
    prop_oneof![3 => Just(Outcome::Failure), 1 => Just(Outcome::Success)]
}

proptest! {
    #[test]
    fn prop_backoff_monotonic_and_capped(config in config_strategy(), attempt in 0u32..64) {
        let ceiling = config.delay_ceiling;
        let policy = ReconnectPolicy::new(config);

        let here = policy.backoff_delay(attempt);
        let next = policy.backoff_delay(attempt + 1);

        prop_assert!(here <= next);
        prop_assert!(next <= ceiling);
    }

    #[test]
    fn prop_gives_up_exactly_after_ceiling(config in config_strategy(), extra in 0u32..5) {
        let max_attempts = config.max_attempts;
        let mut policy = ReconnectPolicy::new(config);

        for _ in 0..max_attempts {
            let is_retry = matches!(policy.on_failure(), ReconnectDecision::Retry { .. });
            prop_assert!(is_retry);
        }

        for _ in 0..=extra {
            let gave_up = matches!(policy.on_failure(), ReconnectDecision::GiveUp { .. });
            prop_assert!(gave_up);
        }
    }

    #[test]
    fn prop_attempts_track_consecutive_failures(
        config in config_strategy(),
        outcomes in prop::collection::vec(outcome_strategy(), 0..40),
    ) {
        let mut policy = ReconnectPolicy::new(config);
        let mut consecutive = 0u32;

        for outcome in outcomes {
            match outcome {
                Outcome::Failure => {
                    consecutive += 1;
                    let _ = policy.on_failure();
                },
                Outcome::Success => {
                    consecutive = 0;
                    policy.on_success();
                },
            }
            prop_assert_eq!(policy.attempt_count(), consecutive);
        }
    }

    #[test]
    fn prop_retry_delay_matches_backoff(config in config_strategy()) {
        let mut policy = ReconnectPolicy::new(config);

        while let ReconnectDecision::Retry { attempt, delay } = policy.on_failure() {
            prop_assert_eq!(delay, policy.backoff_delay(attempt));
            prop_assert_eq!(attempt, policy.attempt_count());
        }
    }
}
