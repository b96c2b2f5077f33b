//! Notifier configuration.

use std::time::Duration;

use barter_core::ReconnectConfig;

/// How long a notification stays visible unless clicked or dismissed.
pub const DEFAULT_DISPLAY_DURATION: Duration = Duration::from_secs(5);

/// Notifier configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierConfig {
    /// Retry timing for the live channel.
    pub reconnect: ReconnectConfig,
    /// Display duration of each notification.
    pub display_for: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self { reconnect: ReconnectConfig::default(), display_for: DEFAULT_DISPLAY_DURATION }
    }
}
