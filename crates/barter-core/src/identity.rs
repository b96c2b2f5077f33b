//! Identity and room keys.
//!
//! Both [`UserId`] and [`RoomId`] are opaque strings issued by the backend.
//! The notifier never inspects them beyond equality; wrapping them keeps a
//! room id from being passed where a user id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque authenticated-user key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw id as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Opaque conversation key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wrap a raw room id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw id as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Router path of the conversation view for this room.
    pub fn chat_path(&self) -> String {
        format!("/chats/{}", self.0)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Source of the currently authenticated identity.
///
/// The session is owned elsewhere (the auth provider). The notifier only
/// reacts to an identity appearing, changing, or disappearing, and always
/// receives it through this trait rather than from ambient state.
pub trait SessionProvider {
    /// Current identity. `None` when signed out.
    fn current(&self) -> Option<UserId>;
}

impl SessionProvider for Option<UserId> {
    fn current(&self) -> Option<UserId> {
        self.clone()
    }
}
