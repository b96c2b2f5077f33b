//! Terminal client for Barter Trade live chat notifications.
//!
//! Wires the [`barter_app::Runtime`] to real I/O: a [`LiveDriver`] that runs
//! the live channel, timers, and REST calls on tokio, and line-oriented
//! terminal surfaces for notifications and navigation.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod command;
pub mod driver;
mod error;
pub mod terminal;

pub use command::{Command, CommandError};
pub use driver::LiveDriver;
pub use error::DriverError;
pub use terminal::{TerminalPresenter, TerminalRouter};
