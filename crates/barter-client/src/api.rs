//! REST calls around the live channel.
//!
//! The notifier only needs a handful of chat routes: the room list and unread
//! count to rebuild the ledger, mark-read, and the message routes used when a
//! conversation is open. Request and response shapes are always available;
//! [`ChatApi`] itself needs the `transport` feature.

use std::time::Duration;

use barter_core::{RoomId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "transport")]
use crate::{ApiError, Endpoints};

/// Deadline applied to every REST request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest error body kept in [`crate::ApiError::Status`].
pub const MAX_ERROR_BODY: usize = 512;

/// REST client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Deadline for each request.
    pub request_timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: concat!("barter-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// `GET /chat/unread` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadResponse {
    /// Rooms with unseen messages. Negative values are clamped to zero.
    pub unread_count: i64,
}

impl UnreadResponse {
    /// Count as a non-negative integer.
    pub fn count(self) -> u32 {
        u32::try_from(self.unread_count.max(0)).unwrap_or(u32::MAX)
    }
}

/// `POST /chat/read/<room_id>` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkReadRequest {
    /// Viewer whose read marker moves.
    pub user_id: UserId,
}

/// `POST /chat/rooms/<room_id>/messages` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Author.
    pub user_id: UserId,
    /// Trimmed message body.
    pub message: String,
}

/// `POST /chat/rooms` body.
///
/// The server returns the existing room when one already matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    /// Listing under discussion.
    pub product_id: String,
    /// Viewer starting the chat.
    pub buyer_id: UserId,
    /// Listing owner.
    pub seller_id: UserId,
}

/// `POST /chat/rooms` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRoom {
    /// Id of the new or existing room.
    pub id: RoomId,
}

/// Stored message row from `GET /chat/rooms/<room_id>/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Message id.
    pub id: String,
    /// Room the message belongs to.
    pub chat_room_id: RoomId,
    /// Author.
    pub sender_id: UserId,
    /// Body.
    pub message: String,
    /// Server timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Whether the recipient has read it.
    #[serde(default)]
    pub is_read: bool,
}

/// HTTP client for the chat routes.
#[cfg(feature = "transport")]
#[derive(Debug, Clone)]
pub struct ChatApi {
    http: reqwest::Client,
    endpoints: Endpoints,
}

#[cfg(feature = "transport")]
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

#[cfg(feature = "transport")]
impl ChatApi {
    /// Create a client for the given origin.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Request` if the HTTP client cannot be built.
    pub fn new(endpoints: Endpoints, config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http, endpoints })
    }

    /// Route layout in use.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// All rooms `user` participates in, most recently updated first.
    pub async fn fetch_rooms(&self, user: &UserId) -> Result<Vec<barter_core::RoomSummary>, ApiError> {
        let resp = self.http.get(self.endpoints.rooms(user)).send().await?;
        Ok(expect_success(resp).await?.json().await?)
    }

    /// Server-side aggregate of unread rooms.
    pub async fn fetch_unread(&self, user: &UserId) -> Result<u32, ApiError> {
        let resp = self.http.get(self.endpoints.unread(user)).send().await?;
        let body: UnreadResponse = expect_success(resp).await?.json().await?;
        Ok(body.count())
    }

    /// Move `user`'s read marker in `room_id` to now.
    pub async fn mark_read(&self, room_id: &RoomId, user: &UserId) -> Result<(), ApiError> {
        let body = MarkReadRequest { user_id: user.clone() };
        let resp = self.http.post(self.endpoints.mark_read(room_id)).json(&body).send().await?;
        expect_success(resp).await?;
        Ok(())
    }

    /// Messages in `room_id`, oldest first.
    pub async fn fetch_messages(&self, room_id: &RoomId) -> Result<Vec<StoredMessage>, ApiError> {
        let resp = self.http.get(self.endpoints.messages(room_id)).send().await?;
        Ok(expect_success(resp).await?.json().await?)
    }

    /// Post a message as `user`.
    pub async fn send_message(&self, room_id: &RoomId, user: &UserId, message: &str) -> Result<(), ApiError> {
        let body = SendMessageRequest { user_id: user.clone(), message: message.to_string() };
        let resp = self.http.post(self.endpoints.messages(room_id)).json(&body).send().await?;
        expect_success(resp).await?;
        Ok(())
    }

    /// Create (or look up) the room for a listing between two users.
    pub async fn create_room(&self, request: &CreateRoomRequest) -> Result<RoomId, ApiError> {
        let resp = self.http.post(self.endpoints.create_room()).json(request).send().await?;
        let room: CreatedRoom = expect_success(resp).await?.json().await?;
        Ok(room.id)
    }
}

#[cfg(feature = "transport")]
async fn expect_success(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Status { status: status.as_u16(), body: body.chars().take(MAX_ERROR_BODY).collect() })
}
