use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::identity::Identity;

/// Authentication state as seen by views. `loading` is true until the
/// identity behind the session has been resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<Identity>,
    pub loading: bool,
}

impl Session {
    pub fn loading() -> Self {
        Self { user: None, loading: true }
    }

    pub fn anonymous() -> Self {
        Self { user: None, loading: false }
    }

    pub fn signed_in(identity: Identity) -> Self {
        Self { user: Some(identity), loading: false }
    }
}

/// Read-only access to the current session. Implementations must answer
/// synchronously; callers read it once per render.
pub trait SessionProvider: Send + Sync {
    fn current(&self) -> Session;
}

impl SessionProvider for Session {
    fn current(&self) -> Session {
        self.clone()
    }
}

impl<T: SessionProvider + ?Sized> SessionProvider for Arc<T> {
    fn current(&self) -> Session {
        (**self).current()
    }
}

impl<T: SessionProvider + ?Sized> SessionProvider for &T {
    fn current(&self) -> Session {
        (**self).current()
    }
}

/// Shared, asynchronously resolved session. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: Arc<watch::Sender<Session>>,
}

impl SessionHandle {
    /// A session that has not been resolved yet.
    pub fn new() -> Self {
        Self::with_state(Session::loading())
    }

    pub fn with_state(session: Session) -> Self {
        let (tx, _rx) = watch::channel(session);
        Self { tx: Arc::new(tx) }
    }

    /// Finish loading with the given identity (or none).
    pub fn resolve(&self, user: Option<Identity>) {
        self.tx.send_replace(Session { user, loading: false });
    }

    /// Put the session back into loading, keeping the last known user.
    pub fn begin_loading(&self) {
        self.tx.send_modify(|session| session.loading = true);
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Waits up to `wait` for loading to finish and returns whatever state
    /// the session is in at that point.
    pub async fn settled(&self, wait: Duration) -> Session {
        let mut rx = self.subscribe();
        let settled = tokio::time::timeout(wait, rx.wait_for(|session| !session.loading))
            .await
            .ok()
            .and_then(|result| result.ok().map(|session| (*session).clone()));

        settled.unwrap_or_else(|| self.current())
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for SessionHandle {
    fn current(&self) -> Session {
        self.tx.borrow().clone()
    }
}
