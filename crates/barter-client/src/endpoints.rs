//! Chat API endpoint layout.
//!
//! All routes hang off one externally supplied API origin. A path prefix on
//! the origin (`https://host/api/`) is preserved.

use barter_core::{RoomId, UserId};
use url::Url;

use crate::error::EndpointError;

/// Builds URLs for every chat route used by the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Parse and validate the API origin.
    ///
    /// # Errors
    ///
    /// - `EndpointError::InvalidOrigin` if `origin` is not a URL with a path
    /// - `EndpointError::UnsupportedScheme` if the scheme is not http(s)
    pub fn new(origin: &str) -> Result<Self, EndpointError> {
        let base = Url::parse(origin).map_err(|e| EndpointError::InvalidOrigin(format!("{origin}: {e}")))?;

        if base.cannot_be_a_base() {
            return Err(EndpointError::InvalidOrigin(origin.to_string()));
        }

        match base.scheme() {
            "http" | "https" => Ok(Self { base }),
            other => Err(EndpointError::UnsupportedScheme(other.to_string())),
        }
    }

    /// API origin.
    pub fn origin(&self) -> &Url {
        &self.base
    }

    /// `GET /chat/events?user_id=<id>` (server-sent events).
    pub fn events(&self, user: &UserId) -> Url {
        self.with_user(self.route(&["chat", "events"]), user)
    }

    /// `/chat/subscribe?user_id=<id>` upgraded to ws/wss.
    ///
    /// # Errors
    ///
    /// Returns `EndpointError::UnsupportedScheme` if the origin scheme has no
    /// WebSocket counterpart.
    pub fn subscribe(&self, user: &UserId) -> Result<Url, EndpointError> {
        let mut url = self.with_user(self.route(&["chat", "subscribe"]), user);
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme).map_err(|()| EndpointError::UnsupportedScheme(url.scheme().to_string()))?;
        Ok(url)
    }

    /// `GET /chat/unread?user_id=<id>`.
    pub fn unread(&self, user: &UserId) -> Url {
        self.with_user(self.route(&["chat", "unread"]), user)
    }

    /// `GET /chat/rooms?user_id=<id>`.
    pub fn rooms(&self, user: &UserId) -> Url {
        self.with_user(self.route(&["chat", "rooms"]), user)
    }

    /// `POST /chat/rooms`.
    pub fn create_room(&self) -> Url {
        self.route(&["chat", "rooms"])
    }

    /// `POST /chat/read/<room_id>`.
    pub fn mark_read(&self, room_id: &RoomId) -> Url {
        self.route(&["chat", "read", room_id.as_str()])
    }

    /// `GET`/`POST /chat/rooms/<room_id>/messages`.
    pub fn messages(&self, room_id: &RoomId) -> Url {
        self.route(&["chat", "rooms", room_id.as_str(), "messages"])
    }

    fn route(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        // Validated in `new`: the origin can be a base
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn with_user(&self, mut url: Url, user: &UserId) -> Url {
        url.query_pairs_mut().append_pair("user_id", user.as_str());
        url
    }
}
