use std::sync::Arc;

use shared::domain::UserSession;
use tokio::sync::watch;

/// Explicit session-context value shared by the screens and the gateway.
///
/// The signed-in user is an immutable value; every change produces a new
/// value and broadcasts it over a watch channel. Nothing mutates a shared
/// record in place, so a screen can never observe a half-applied update.
#[derive(Clone)]
pub struct SessionContext {
    current: Arc<watch::Sender<Option<UserSession>>>,
}

impl SessionContext {
    pub fn new(initial: Option<UserSession>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            current: Arc::new(tx),
        }
    }

    pub fn current(&self) -> Option<UserSession> {
        self.current.borrow().clone()
    }

    pub fn session_id(&self) -> Option<String> {
        self.current
            .borrow()
            .as_ref()
            .map(|session| session.session_id.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn sign_in(&self, session: UserSession) {
        self.current.send_replace(Some(session));
    }

    pub fn clear(&self) {
        self.current.send_replace(None);
    }

    /// Derives the next session value from the current one and broadcasts
    /// it. Returns the new value so the caller can persist it, or `None`
    /// when nobody is signed in.
    pub fn update(&self, apply: impl FnOnce(&mut UserSession)) -> Option<UserSession> {
        let mut next = self.current.borrow().clone()?;
        apply(&mut next);
        self.current.send_replace(Some(next.clone()));
        Some(next)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserSession>> {
        self.current.subscribe()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(None)
    }
}
