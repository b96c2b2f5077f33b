//! Notification state machine.
//!
//! This module defines the [`Notifier`], which composes the reconnection
//! policy, the event dispatcher, and the unread ledger around one live
//! channel. It consumes [`NotifierEvent`]s and produces [`NotifierAction`]s
//! for a driver to execute; it performs no I/O and reads no clock.
//!
//! # Responsibilities
//!
//! - Keeps at most one channel open, scoped to the current identity.
//! - Schedules reopens with exponential backoff and gives up past the limit.
//! - Turns `new_message` events into notifications or silent refreshes.
//! - Tracks unread rooms, per-room drafts, and visible notifications.
//!
//! # Channel generations
//!
//! Every open, close, and replacement bumps the [`Generation`]. Channel
//! signals and backoff timers carry the generation they were created for, so
//! a signal racing a teardown or an identity change is dropped here instead
//! of resurrecting a closed channel.

use std::collections::{BTreeMap, HashMap};

use barter_client::api::StoredMessage;
use barter_core::{
    ChatMessage, Dispatch, Dispatcher, InboundEvent, ReconnectDecision, ReconnectPolicy, RoomId,
    SendError, StartChatError, UnreadLedger, UserId,
};

use crate::{
    ApiCall, ChannelState, Generation, Notification, NotificationId, NotifierAction, NotifierConfig,
    NotifierEvent,
};

/// Live chat notification state machine.
#[derive(Debug, Clone)]
pub struct Notifier {
    config: NotifierConfig,
    identity: Option<UserId>,
    channel: ChannelState,
    generation: Generation,
    policy: ReconnectPolicy,
    dispatcher: Dispatcher,
    ledger: UnreadLedger,
    notifications: BTreeMap<NotificationId, Notification>,
    next_notification: u64,
    drafts: HashMap<RoomId, String>,
    conversation: Option<(RoomId, Vec<StoredMessage>)>,
    lost_reported: bool,
    torn_down: bool,
}

impl Notifier {
    /// Create an idle notifier. Nothing happens until an identity arrives.
    pub fn new(config: NotifierConfig) -> Self {
        Self {
            policy: ReconnectPolicy::new(config.reconnect.clone()),
            config,
            identity: None,
            channel: ChannelState::Idle,
            generation: Generation::ZERO,
            dispatcher: Dispatcher::new(),
            ledger: UnreadLedger::new(),
            notifications: BTreeMap::new(),
            next_notification: 0,
            drafts: HashMap::new(),
            conversation: None,
            lost_reported: false,
            torn_down: false,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: NotifierEvent) -> Vec<NotifierAction> {
        if self.torn_down {
            tracing::trace!(?event, "ignoring event after teardown");
            return Vec::new();
        }

        match event {
            NotifierEvent::IdentityChanged(identity) => self.set_identity(identity),
            NotifierEvent::OpenRoom { room_id } => self.open_room(room_id),
            NotifierEvent::CloseRoom => self.close_room(),
            NotifierEvent::SendMessage { room_id, text } => {
                self.send_message(room_id, &text).unwrap_or_else(|e| show_error(e.to_string()))
            },
            NotifierEvent::StartChat { product_id, product_name, seller_id } => self
                .start_chat(product_id, product_name, seller_id)
                .unwrap_or_else(|e| show_error(e.to_string())),
            NotifierEvent::RetryNow => self.retry_now(),
            NotifierEvent::ChannelOpened { generation } => self.on_channel_opened(generation),
            NotifierEvent::Payload { generation, raw } => self.on_payload(generation, &raw),
            NotifierEvent::ChannelFailed { generation, reason } => self.on_channel_failed(generation, &reason),
            NotifierEvent::ReconnectDue { generation } => self.on_reconnect_due(generation),
            NotifierEvent::RoomsFetched { identity, rooms } => {
                self.ledger.apply_rooms(&identity, rooms);
                Vec::new()
            },
            NotifierEvent::UnreadFetched { identity, count } => {
                self.ledger.apply_count(&identity, count);
                Vec::new()
            },
            NotifierEvent::RefreshFailed { identity, error } => {
                tracing::warn!(%identity, %error, "unread refresh failed, keeping previous count");
                Vec::new()
            },
            NotifierEvent::RoomLoaded { identity, room_id, messages } => {
                self.on_room_loaded(&identity, room_id, messages)
            },
            NotifierEvent::RoomLoadFailed { room_id, error } => {
                tracing::warn!(%room_id, %error, "conversation reload failed");
                Vec::new()
            },
            NotifierEvent::MarkedRead { identity, room_id } => self.on_marked_read(identity, &room_id),
            NotifierEvent::MarkReadFailed { room_id, error } => {
                tracing::warn!(%room_id, %error, "mark read failed");
                Vec::new()
            },
            NotifierEvent::MessageSent { room_id } => {
                self.drafts.remove(&room_id);
                match self.identity.clone() {
                    Some(identity) => vec![NotifierAction::Api(ApiCall::LoadRoom { room_id, identity })],
                    None => Vec::new(),
                }
            },
            NotifierEvent::SendFailed { room_id, error } => {
                tracing::warn!(%room_id, %error, "send failed, draft kept");
                show_error(format!("message not sent: {error}"))
            },
            NotifierEvent::ChatStarted { identity, room_id, product_name } => {
                self.on_chat_started(&identity, room_id, &product_name)
            },
            NotifierEvent::StartChatFailed { error } => {
                tracing::warn!(%error, "could not start chat");
                show_error(format!("could not start chat: {error}"))
            },
            NotifierEvent::NotificationClicked { id } => self.click(id),
            NotifierEvent::NotificationDismissed { id } | NotifierEvent::NotificationExpired { id } => {
                self.dismiss(id)
            },
            NotifierEvent::Teardown => self.teardown(),
        }
    }

    /// Track a new identity.
    ///
    /// Any channel or pending reopen for the previous identity is released
    /// first. State scoped to the previous identity (unread rooms, drafts,
    /// notifications, the conversation on screen) is dropped.
    pub fn set_identity(&mut self, identity: Option<UserId>) -> Vec<NotifierAction> {
        if identity == self.identity {
            return Vec::new();
        }

        tracing::info!(
            previous = ?self.identity.as_ref().map(UserId::as_str),
            current = ?identity.as_ref().map(UserId::as_str),
            "identity changed"
        );

        let mut actions = self.release_channel();
        actions.extend(self.dismiss_all());

        self.policy.reset();
        self.lost_reported = false;
        self.ledger.reset(identity.clone());
        self.dispatcher.set_viewer(identity.clone());
        self.dispatcher.set_active_room(None);
        self.conversation = None;
        self.drafts.clear();
        self.identity = identity;

        let Some(identity) = self.identity.clone() else {
            self.channel = ChannelState::Idle;
            return actions;
        };

        actions.push(self.open_channel(identity.clone()));
        actions.push(NotifierAction::Api(ApiCall::RefreshLedger { identity }));
        actions
    }

    /// Viewer opened a conversation.
    ///
    /// The room stops producing notifications, its read marker moves, and its
    /// messages are reloaded. Visible notifications for it are dismissed.
    pub fn open_room(&mut self, room_id: RoomId) -> Vec<NotifierAction> {
        self.dispatcher.set_active_room(Some(room_id.clone()));
        if self.conversation.as_ref().is_some_and(|(id, _)| id != &room_id) {
            self.conversation = None;
        }

        let stale: Vec<NotificationId> =
            self.notifications.values().filter(|n| n.room_id == room_id).map(|n| n.id).collect();
        let mut actions: Vec<NotifierAction> = stale.into_iter().flat_map(|id| self.dismiss(id)).collect();

        if let Some(identity) = self.identity.clone() {
            self.ledger.note_read(&room_id);
            actions.push(NotifierAction::Api(ApiCall::LoadRoom {
                room_id: room_id.clone(),
                identity: identity.clone(),
            }));
            actions.push(NotifierAction::Api(ApiCall::MarkRead { room_id, identity }));
        }
        actions
    }

    /// Viewer left the conversation view.
    pub fn close_room(&mut self) -> Vec<NotifierAction> {
        self.dispatcher.set_active_room(None);
        self.conversation = None;
        Vec::new()
    }

    /// Send a message to `room_id`.
    ///
    /// The trimmed text is kept as the room's draft until the server confirms
    /// it, so a failed send loses nothing.
    ///
    /// # Errors
    ///
    /// - `SendError::NotSignedIn` without an identity
    /// - `SendError::EmptyMessage` if `text` is blank
    pub fn send_message(&mut self, room_id: RoomId, text: &str) -> Result<Vec<NotifierAction>, SendError> {
        let identity = self.identity.clone().ok_or(SendError::NotSignedIn)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(SendError::EmptyMessage);
        }

        self.drafts.insert(room_id.clone(), text.to_string());
        Ok(vec![NotifierAction::Api(ApiCall::SendMessage { room_id, identity, text: text.to_string() })])
    }

    /// Open a conversation about `product_id` with its owner.
    ///
    /// Navigates straight to an existing room when the ledger already knows
    /// one; otherwise asks the server to create it. A created room gets an
    /// opening message quoting `product_name`.
    ///
    /// # Errors
    ///
    /// - `StartChatError::NotSignedIn` without an identity
    /// - `StartChatError::OwnListing` if the viewer owns the listing
    pub fn start_chat(
        &mut self,
        product_id: String,
        product_name: String,
        seller_id: UserId,
    ) -> Result<Vec<NotifierAction>, StartChatError> {
        let identity = self.identity.clone().ok_or(StartChatError::NotSignedIn)?;
        if seller_id == identity {
            return Err(StartChatError::OwnListing);
        }

        let existing = self.ledger.rooms().iter().find(|room| {
            room.product_id.as_deref() == Some(product_id.as_str())
                && room.buyer_id == identity
                && room.seller_id == seller_id
        });

        if let Some(room) = existing {
            return Ok(vec![NotifierAction::Navigate { path: room.id.chat_path() }]);
        }

        Ok(vec![NotifierAction::Api(ApiCall::CreateRoom {
            product_id,
            product_name,
            buyer_id: identity,
            seller_id,
        })])
    }

    /// Reopen the channel now, resetting backoff.
    ///
    /// Only meaningful while backing off or after giving up.
    pub fn retry_now(&mut self) -> Vec<NotifierAction> {
        let Some(identity) = self.identity.clone() else {
            return Vec::new();
        };
        if !matches!(self.channel, ChannelState::Backoff { .. } | ChannelState::Disconnected { .. }) {
            return Vec::new();
        }

        tracing::info!(%identity, "manual reconnect");
        self.policy.reset();
        self.lost_reported = false;

        let mut actions = vec![NotifierAction::CancelReconnect];
        actions.push(self.open_channel(identity));
        actions
    }

    /// Release everything. Later events are ignored.
    pub fn teardown(&mut self) -> Vec<NotifierAction> {
        tracing::info!("notifier teardown");
        let mut actions = self.release_channel();
        actions.extend(self.dismiss_all());
        self.channel = ChannelState::Idle;
        self.torn_down = true;
        actions
    }

    fn on_channel_opened(&mut self, generation: Generation) -> Vec<NotifierAction> {
        if !self.is_current(generation) {
            tracing::debug!(%generation, current = %self.generation, "ignoring open of stale channel");
            return Vec::new();
        }

        tracing::info!(%generation, "live channel open");
        let recovering = self.policy.attempt_count() > 0;
        self.mark_healthy();

        // Messages may have arrived while the channel was down
        match (recovering, self.identity.clone()) {
            (true, Some(identity)) => vec![NotifierAction::Api(ApiCall::RefreshLedger { identity })],
            _ => Vec::new(),
        }
    }

    fn on_payload(&mut self, generation: Generation, raw: &str) -> Vec<NotifierAction> {
        if !self.is_current(generation) {
            return Vec::new();
        }

        let event = match InboundEvent::decode(raw) {
            Ok(Some(event)) => event,
            Ok(None) => {
                tracing::debug!("ignoring unknown event kind");
                return Vec::new();
            },
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed payload");
                return Vec::new();
            },
        };

        tracing::debug!(kind = event.kind(), %generation, "inbound event");

        let mut actions = Vec::new();
        for dispatch in self.dispatcher.dispatch(event) {
            match dispatch {
                Dispatch::Healthy => self.mark_healthy(),
                Dispatch::RefreshRoom { room_id } => {
                    if let Some(identity) = self.identity.clone() {
                        actions.push(NotifierAction::Api(ApiCall::LoadRoom {
                            room_id: room_id.clone(),
                            identity: identity.clone(),
                        }));
                        actions.push(NotifierAction::Api(ApiCall::MarkRead { room_id, identity }));
                    }
                },
                Dispatch::Notify { room_id, message } => actions.push(self.present(room_id, &message)),
                Dispatch::RefreshLedger { .. } => {
                    if let Some(identity) = self.identity.clone() {
                        actions.push(NotifierAction::Api(ApiCall::RefreshLedger { identity }));
                    }
                },
            }
        }
        actions
    }

    fn on_channel_failed(&mut self, generation: Generation, reason: &str) -> Vec<NotifierAction> {
        if !self.is_current(generation) {
            return Vec::new();
        }

        // The failed channel's signals are stale from here on
        self.generation = self.generation.next();
        let mut actions = vec![NotifierAction::CloseChannel];

        match self.policy.on_failure() {
            ReconnectDecision::Retry { attempt, delay } => {
                tracing::warn!(%reason, attempt, delay_ms = delay.as_millis() as u64, "live channel lost, retrying");
                self.channel = ChannelState::Backoff { attempt, delay };
                actions.push(NotifierAction::ScheduleReconnect { delay, generation: self.generation });
            },
            ReconnectDecision::GiveUp { attempts } => {
                tracing::error!(%reason, attempts, "live channel lost, giving up");
                self.channel = ChannelState::Disconnected { attempts };
                if !self.lost_reported {
                    self.lost_reported = true;
                    actions.push(NotifierAction::ConnectionLost { attempts });
                }
            },
        }
        actions
    }

    fn on_reconnect_due(&mut self, generation: Generation) -> Vec<NotifierAction> {
        if generation != self.generation || !matches!(self.channel, ChannelState::Backoff { .. }) {
            tracing::debug!(%generation, current = %self.generation, "ignoring stale reconnect timer");
            return Vec::new();
        }

        // Always the identity current at firing time
        match self.identity.clone() {
            Some(identity) => vec![self.open_channel(identity)],
            None => Vec::new(),
        }
    }

    fn on_marked_read(&mut self, identity: UserId, room_id: &RoomId) -> Vec<NotifierAction> {
        if self.identity.as_ref() != Some(&identity) {
            return Vec::new();
        }

        self.ledger.note_read(room_id);
        vec![NotifierAction::Api(ApiCall::RefreshLedger { identity })]
    }

    fn on_room_loaded(
        &mut self,
        identity: &UserId,
        room_id: RoomId,
        messages: Vec<StoredMessage>,
    ) -> Vec<NotifierAction> {
        if self.identity.as_ref() != Some(identity) || self.dispatcher.active_room() != Some(&room_id) {
            tracing::debug!(%room_id, "discarding conversation no longer on screen");
            return Vec::new();
        }

        self.conversation = Some((room_id.clone(), messages.clone()));
        vec![NotifierAction::ShowConversation { room_id, messages }]
    }

    fn on_chat_started(&mut self, identity: &UserId, room_id: RoomId, product_name: &str) -> Vec<NotifierAction> {
        if self.identity.as_ref() != Some(identity) {
            tracing::debug!(%room_id, "discarding chat started by previous identity");
            return Vec::new();
        }

        let mut actions = vec![NotifierAction::Navigate { path: room_id.chat_path() }];
        match self.send_message(room_id, &opening_message(product_name)) {
            Ok(send) => actions.extend(send),
            Err(e) => tracing::warn!(error = %e, "opening message not sent"),
        }
        actions.push(NotifierAction::Api(ApiCall::RefreshLedger { identity: identity.clone() }));
        actions
    }

    fn present(&mut self, room_id: RoomId, message: &ChatMessage) -> NotifierAction {
        self.next_notification += 1;
        let notification = Notification {
            id: NotificationId(self.next_notification),
            room_id: room_id.clone(),
            text: message.preview(),
        };

        self.ledger.note_incoming(&room_id);
        self.notifications.insert(notification.id, notification.clone());
        tracing::debug!(id = %notification.id, %room_id, "presenting notification");

        NotifierAction::Present { notification, display_for: self.config.display_for }
    }

    fn click(&mut self, id: NotificationId) -> Vec<NotifierAction> {
        match self.notifications.remove(&id) {
            Some(notification) => {
                vec![NotifierAction::Navigate { path: notification.target() }, NotifierAction::Dismiss { id }]
            },
            None => Vec::new(),
        }
    }

    fn dismiss(&mut self, id: NotificationId) -> Vec<NotifierAction> {
        match self.notifications.remove(&id) {
            Some(_) => vec![NotifierAction::Dismiss { id }],
            None => Vec::new(),
        }
    }

    fn dismiss_all(&mut self) -> Vec<NotifierAction> {
        std::mem::take(&mut self.notifications).into_keys().map(|id| NotifierAction::Dismiss { id }).collect()
    }

    fn open_channel(&mut self, identity: UserId) -> NotifierAction {
        self.generation = self.generation.next();
        self.channel = ChannelState::Connecting;
        tracing::info!(%identity, generation = %self.generation, "opening live channel");
        NotifierAction::OpenChannel { identity, generation: self.generation }
    }

    fn release_channel(&mut self) -> Vec<NotifierAction> {
        let actions = match self.channel {
            ChannelState::Idle | ChannelState::Disconnected { .. } => Vec::new(),
            ChannelState::Connecting | ChannelState::Open => vec![NotifierAction::CloseChannel],
            ChannelState::Backoff { .. } => vec![NotifierAction::CancelReconnect],
        };
        self.generation = self.generation.next();
        actions
    }

    fn mark_healthy(&mut self) {
        self.policy.on_success();
        self.lost_reported = false;
        if self.channel == ChannelState::Connecting {
            self.channel = ChannelState::Open;
        }
    }

    fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation && self.channel.is_live()
    }

    /// Current identity.
    pub fn identity(&self) -> Option<&UserId> {
        self.identity.as_ref()
    }

    /// Live channel state.
    pub fn channel_state(&self) -> &ChannelState {
        &self.channel
    }

    /// Current channel generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Consecutive channel failures.
    pub fn attempt_count(&self) -> u32 {
        self.policy.attempt_count()
    }

    /// Rooms with unseen messages. 0 without an identity.
    pub fn unread_count(&self) -> u32 {
        self.ledger.count()
    }

    /// Unread ledger.
    pub fn ledger(&self) -> &UnreadLedger {
        &self.ledger
    }

    /// Conversation on screen, if any.
    pub fn active_room(&self) -> Option<&RoomId> {
        self.dispatcher.active_room()
    }

    /// Messages of the conversation on screen, once loaded.
    pub fn conversation(&self) -> Option<&[StoredMessage]> {
        self.conversation.as_ref().map(|(_, messages)| messages.as_slice())
    }

    /// Unsent text for `room_id`.
    pub fn draft(&self, room_id: &RoomId) -> Option<&str> {
        self.drafts.get(room_id).map(String::as_str)
    }

    /// Notifications currently visible, oldest first.
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.values()
    }

    /// Configuration in use.
    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }
}

fn show_error(message: String) -> Vec<NotifierAction> {
    vec![NotifierAction::ShowError { message }]
}

/// First message posted into a newly created room.
fn opening_message(product_name: &str) -> String {
    format!("Hi, I'm interested in your product \"{product_name}\"")
}
