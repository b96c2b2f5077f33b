//! Reconnection policy for the live channel.
//!
//! Decides whether and when to reopen the channel after a failure. The policy
//! is a plain counter: it never sleeps and never touches a transport. The
//! caller schedules the returned delay and must cancel it if the identity
//! changes or the notifier is torn down first.
//!
//! # Backoff
//!
//! ```text
//! delay(attempt) = min(base_delay * 2^attempt, delay_ceiling)
//!
//! failure #1 -> 2s   failure #4 -> 16s
//! failure #2 -> 4s   failure #5 -> 30s (ceiling)
//! failure #3 -> 8s   failure #6 -> give up
//! ```
//!
//! Any successfully processed event resets the counter, so a flaky channel
//! that still delivers data is never driven to the ceiling.

use std::time::Duration;

/// Failures tolerated before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Backoff unit. The first retry waits twice this long.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Upper bound on any single backoff delay.
pub const DEFAULT_DELAY_CEILING: Duration = Duration::from_secs(30);

/// Reconnection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Consecutive failures after which no reopen is scheduled.
    pub max_attempts: u32,
    /// Backoff unit.
    pub base_delay: Duration,
    /// Maximum delay between attempts.
    pub delay_ceiling: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            delay_ceiling: DEFAULT_DELAY_CEILING,
        }
    }
}

/// Outcome of reporting a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Reopen after `delay`.
    Retry {
        /// Attempt number this reopen represents (1-based).
        attempt: u32,
        /// Time to wait before reopening.
        delay: Duration,
    },
    /// Ceiling exceeded. Nothing is scheduled.
    GiveUp {
        /// Consecutive failures observed so far.
        attempts: u32,
    },
}

/// Exponential backoff with a fixed attempt ceiling.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    config: ReconnectConfig,
    attempt_count: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(ReconnectConfig::default())
    }
}

impl ReconnectPolicy {
    /// Create a policy with no recorded failures.
    pub fn new(config: ReconnectConfig) -> Self {
        Self { config, attempt_count: 0 }
    }

    /// Consecutive failures since the last success.
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Active configuration.
    pub fn config(&self) -> &ReconnectConfig {
        &self.config
    }

    /// True once the ceiling has been exceeded.
    pub fn is_exhausted(&self) -> bool {
        self.attempt_count > self.config.max_attempts
    }

    /// Delay before reopen number `attempt`.
    ///
    /// Non-decreasing in `attempt` and never above the ceiling. Saturates
    /// instead of overflowing for large attempt numbers.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let ceiling = self.config.delay_ceiling;
        let delay = 2u32.checked_pow(attempt).and_then(|factor| self.config.base_delay.checked_mul(factor));
        delay.map_or(ceiling, |delay| delay.min(ceiling))
    }

    /// Record a channel failure and decide what to do next.
    pub fn on_failure(&mut self) -> ReconnectDecision {
        self.attempt_count = self.attempt_count.saturating_add(1);

        if self.is_exhausted() {
            return ReconnectDecision::GiveUp { attempts: self.attempt_count };
        }

        let attempt = self.attempt_count;
        ReconnectDecision::Retry { attempt, delay: self.backoff_delay(attempt) }
    }

    /// Record a successfully processed event.
    pub fn on_success(&mut self) {
        if self.attempt_count > 0 {
            tracing::debug!(attempts = self.attempt_count, "channel healthy, backoff reset");
        }
        self.attempt_count = 0;
    }

    /// Forget all failures (identity change, manual retry).
    pub fn reset(&mut self) {
        self.attempt_count = 0;
    }
}
