//! Application layer for Barter Trade live notifications
//!
//! Pure state machine and generic runtime for the live chat channel, enabling
//! deterministic tests with the same code that runs in production.
//!
//! # Components
//!
//! - [`Notifier`]: Channel lifecycle, dispatch, unread ledger, notifications
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver
//! - [`Session`] / [`SessionHandle`]: Watch-based identity source
//! - [`Presenter`] / [`Router`]: Host UI boundaries

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod config;
mod driver;
mod event;
mod notifier;
mod runtime;
mod session;
mod state;

pub use action::{ApiCall, NotifierAction};
pub use config::{DEFAULT_DISPLAY_DURATION, NotifierConfig};
pub use driver::{Driver, Presenter, Router};
pub use event::NotifierEvent;
pub use notifier::Notifier;
pub use runtime::Runtime;
pub use session::{Session, SessionHandle};
pub use state::{ChannelState, Generation, Notification, NotificationId};
