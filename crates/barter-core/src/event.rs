//! Inbound chat events.
//!
//! The backend pushes JSON objects shaped `{ "type": ..., "room_id": ...,
//! "message": ... }`. Decoding happens once, here, into the closed
//! [`InboundEvent`] set. Tags outside that set decode to `Ok(None)` so newer
//! servers can add event kinds without breaking older clients.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{DecodeError, RoomId, UserId};

/// Events pushed over the live channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Server confirmed the channel.
    Connected,

    /// Keep-alive. Carries no data.
    Heartbeat,

    /// A message was posted to a room the viewer participates in.
    NewMessage {
        /// Conversation the message belongs to.
        room_id: RoomId,
        /// Message body and sender.
        message: ChatMessage,
    },
}

/// A chat message as carried by a `new_message` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Author, when the server includes it.
    pub sender_id: Option<UserId>,
    /// Author display name, when the server includes it.
    pub sender_name: Option<String>,
    /// Message body.
    pub text: String,
    /// Server timestamp, when included.
    pub sent_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// Message with only a body.
    pub fn text(text: impl Into<String>) -> Self {
        Self { sender_id: None, sender_name: None, text: text.into(), sent_at: None }
    }

    /// Text shown in a notification: `"Name: body"` when the sender is known.
    pub fn preview(&self) -> String {
        match &self.sender_name {
            Some(name) => format!("{name}: {}", self.text),
            None => self.text.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireEvent {
    Connected,
    Heartbeat,
    NewMessage {
        room_id: RoomId,
        message: WireMessage,
    },
    #[serde(other)]
    Unknown,
}

// Older servers send the body as a bare string; newer ones send the row.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireMessage {
    Text(String),
    Record {
        sender_id: Option<UserId>,
        sender_name: Option<String>,
        #[serde(alias = "text")]
        message: String,
        created_at: Option<DateTime<Utc>>,
    },
}

impl From<WireMessage> for ChatMessage {
    fn from(wire: WireMessage) -> Self {
        match wire {
            WireMessage::Text(text) => Self::text(text),
            WireMessage::Record { sender_id, sender_name, message, created_at } => {
                Self { sender_id, sender_name, text: message, sent_at: created_at }
            },
        }
    }
}

impl InboundEvent {
    /// Decode one payload.
    ///
    /// Returns `Ok(None)` for well-formed events of an unknown kind.
    ///
    /// # Errors
    ///
    /// - `DecodeError::Empty` if the payload is blank
    /// - `DecodeError::Malformed` if it is not JSON or misses required fields
    pub fn decode(payload: &str) -> Result<Option<Self>, DecodeError> {
        let payload = payload.trim();
        if payload.is_empty() {
            return Err(DecodeError::Empty);
        }

        let event = match serde_json::from_str::<WireEvent>(payload)? {
            WireEvent::Connected => Some(Self::Connected),
            WireEvent::Heartbeat => Some(Self::Heartbeat),
            WireEvent::NewMessage { room_id, message } => {
                Some(Self::NewMessage { room_id, message: message.into() })
            },
            WireEvent::Unknown => None,
        };

        Ok(event)
    }

    /// Wire name of this event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Heartbeat => "heartbeat",
            Self::NewMessage { .. } => "new_message",
        }
    }
}
