//! Generic runtime for notifier orchestration.
//!
//! The Runtime drives the notifier event loop, coordinating between:
//! - [`Notifier`]: Pure state machine
//! - [`SessionHandle`]: Identity changes
//! - [`Driver`]: Platform-specific I/O
//!
//! The notifier is only touched from this loop, so it needs no locking. The
//! unread count is published through a watch channel after every event.

use barter_core::SessionProvider;
use tokio::sync::watch;

use crate::{Driver, Notifier, NotifierAction, NotifierConfig, NotifierEvent, SessionHandle};

/// Generic runtime that orchestrates Notifier, session, and Driver.
pub struct Runtime<D: Driver> {
    driver: D,
    notifier: Notifier,
    session: SessionHandle,
    unread: watch::Sender<u32>,
}

impl<D: Driver> Runtime<D> {
    /// Create a new runtime.
    pub fn new(driver: D, config: NotifierConfig, session: SessionHandle) -> Self {
        let (unread, _rx) = watch::channel(0);
        Self { driver, notifier: Notifier::new(config), session, unread }
    }

    /// Reader of the unread count. Always 0 without an identity.
    pub fn unread_count(&self) -> watch::Receiver<u32> {
        self.unread.subscribe()
    }

    /// Run until teardown or until the driver runs out of events.
    ///
    /// The driver is stopped on every exit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver's event source fails.
    pub async fn run(mut self) -> Result<(), D::Error> {
        let result = self.event_loop().await;
        if !matches!(self.notifier.channel_state(), crate::ChannelState::Idle) {
            let actions = self.notifier.teardown();
            self.execute(actions);
        }
        self.driver.stop();
        result
    }

    async fn event_loop(&mut self) -> Result<(), D::Error> {
        let initial = self.session.current();
        self.process(NotifierEvent::IdentityChanged(initial));

        let mut watching_session = true;
        loop {
            let event = tokio::select! {
                biased;

                changed = self.session.changed(), if watching_session => match changed {
                    Some(identity) => NotifierEvent::IdentityChanged(identity),
                    None => {
                        tracing::debug!("session closed, keeping last identity");
                        watching_session = false;
                        continue;
                    },
                },
                event = self.driver.next_event() => match event? {
                    Some(event) => event,
                    None => return Ok(()),
                },
            };

            let teardown = matches!(event, NotifierEvent::Teardown);
            self.process(event);
            if teardown {
                return Ok(());
            }
        }
    }

    fn process(&mut self, event: NotifierEvent) {
        let actions = self.notifier.handle(event);
        self.execute(actions);

        let count = self.notifier.unread_count();
        self.unread.send_if_modified(|current| {
            if *current == count {
                return false;
            }
            *current = count;
            true
        });
    }

    fn execute(&mut self, actions: Vec<NotifierAction>) {
        for action in actions {
            match action {
                NotifierAction::OpenChannel { identity, generation } => {
                    self.driver.close_channel();
                    self.driver.open_channel(&identity, generation);
                },
                NotifierAction::CloseChannel => self.driver.close_channel(),
                NotifierAction::ScheduleReconnect { delay, generation } => {
                    self.driver.schedule_reconnect(delay, generation);
                },
                NotifierAction::CancelReconnect => self.driver.cancel_reconnect(),
                NotifierAction::Api(call) => self.driver.call(call),
                NotifierAction::Present { notification, display_for } => {
                    self.driver.present(&notification, display_for);
                },
                NotifierAction::Dismiss { id } => self.driver.dismiss(id),
                NotifierAction::Navigate { path } => self.driver.navigate(&path),
                NotifierAction::ShowError { message } => self.driver.show_error(&message),
                NotifierAction::ShowConversation { room_id, messages } => {
                    self.driver.show_conversation(&room_id, &messages);
                },
                NotifierAction::ConnectionLost { attempts } => self.driver.connection_lost(attempts),
            }
        }
    }
}
