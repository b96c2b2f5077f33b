//! Core logic for Barter Trade live chat notifications.
//!
//! Everything in this crate is pure: no sockets, no timers, no clocks. Callers
//! feed in decoded events and fetch results, and get back decisions for the
//! driver to execute. This keeps the notification behavior deterministic and
//! testable without a network.
//!
//! # Components
//!
//! - [`InboundEvent`]: Closed set of events pushed by the chat backend
//! - [`ReconnectPolicy`]: Exponential backoff with a give-up ceiling
//! - [`Dispatcher`]: Routes events to silent refresh or visible notification
//! - [`UnreadLedger`]: Count of rooms with messages newer than the viewer's
//!   read marker
//! - [`SessionProvider`]: Source of the current [`UserId`]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod dispatcher;
pub mod error;
pub mod event;
pub mod identity;
pub mod ledger;
pub mod reconnect;

pub use dispatcher::{Dispatch, Dispatcher};
pub use error::{DecodeError, SendError, StartChatError};
pub use event::{ChatMessage, InboundEvent};
pub use identity::{RoomId, SessionProvider, UserId};
pub use ledger::{Role, RoomSummary, UnreadLedger};
pub use reconnect::{ReconnectConfig, ReconnectDecision, ReconnectPolicy};
