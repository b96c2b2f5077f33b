//! Watch-based session plumbing.
//!
//! The auth layer owns a [`Session`] and updates it on sign-in and sign-out.
//! The runtime holds a [`SessionHandle`] and reacts to every change. Only the
//! latest identity matters, so intermediate values may be skipped.

use barter_core::{SessionProvider, UserId};
use tokio::sync::watch;

/// Writer side of the session, held by the auth layer.
#[derive(Debug)]
pub struct Session {
    tx: watch::Sender<Option<UserId>>,
}

impl Session {
    /// Create a session with an initial identity.
    pub fn new(initial: Option<UserId>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Replace the identity. Readers are woken only if it changed.
    pub fn set(&self, identity: Option<UserId>) {
        self.tx.send_if_modified(|current| {
            if *current == identity {
                return false;
            }
            *current = identity;
            true
        });
    }

    /// Sign in as `user`.
    pub fn sign_in(&self, user: UserId) {
        self.set(Some(user));
    }

    /// Sign out.
    pub fn sign_out(&self) {
        self.set(None);
    }

    /// New reader of this session.
    pub fn subscribe(&self) -> SessionHandle {
        SessionHandle { rx: self.tx.subscribe() }
    }
}

impl SessionProvider for Session {
    fn current(&self) -> Option<UserId> {
        self.tx.borrow().clone()
    }
}

/// Reader side of the session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<Option<UserId>>,
}

impl SessionHandle {
    /// Wait for the identity to change and return the new value.
    ///
    /// Returns `None` once the [`Session`] is dropped. Cancel safe.
    pub async fn changed(&mut self) -> Option<Option<UserId>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

impl SessionProvider for SessionHandle {
    fn current(&self) -> Option<UserId> {
        self.rx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn readers_see_latest_identity() {
        let session = Session::new(None);
        let mut handle = session.subscribe();
        assert_eq!(handle.current(), None);

        session.sign_in(UserId::new("u-1"));
        assert_eq!(handle.changed().await, Some(Some(UserId::new("u-1"))));

        session.sign_out();
        assert_eq!(handle.changed().await, Some(None));
    }

    #[tokio::test]
    async fn setting_same_identity_does_not_wake() {
        let session = Session::new(Some(UserId::new("u-1")));
        let handle = session.subscribe();

        session.sign_in(UserId::new("u-1"));
        assert!(!handle.rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn dropped_session_ends_changes() {
        let session = Session::new(None);
        let mut handle = session.subscribe();
        drop(session);

        assert_eq!(handle.changed().await, None);
    }
}
