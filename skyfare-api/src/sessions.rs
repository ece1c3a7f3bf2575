use chrono::{DateTime, Utc};
use skyfare_core::{IdentityResolver, SessionHandle, SessionProvider};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;

struct SessionEntry {
    handle: SessionHandle,
    last_seen: Instant,
}

impl SessionEntry {
    fn new(handle: SessionHandle) -> Self {
        Self {
            handle,
            last_seen: Instant::now(),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.handle
            .current()
            .user
            .is_some_and(|user| user.is_expired_at(now))
    }

    /// Resolved to nobody. The guard forgets these on redirect, but a sweep
    /// can still find one if the request that created it never came back.
    fn is_anonymous(&self) -> bool {
        let session = self.handle.current();
        !session.loading && session.user.is_none()
    }
}

/// Sessions keyed by their token. The first request carrying a token starts
/// resolving it in the background; later requests share the same handle until
/// the identity behind it expires.
pub struct SessionRegistry {
    resolver: Arc<dyn IdentityResolver>,
    idle_timeout: Duration,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new(resolver: Arc<dyn IdentityResolver>, idle_timeout: Duration) -> Self {
        Self {
            resolver,
            idle_timeout,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn session_for(&self, token: &str) -> SessionHandle {
        let mut sessions = self.sessions.write().await;

        if let Some(entry) = sessions.get_mut(token) {
            if !entry.is_expired(Utc::now()) {
                entry.last_seen = Instant::now();
                return entry.handle.clone();
            }
            tracing::debug!("Session identity expired, resolving token again");
        }

        let handle = SessionHandle::new();
        sessions.insert(token.to_string(), SessionEntry::new(handle.clone()));
        drop(sessions);

        self.spawn_resolution(token.to_string(), handle.clone());
        handle
    }

    fn spawn_resolution(&self, token: String, handle: SessionHandle) {
        let resolver = self.resolver.clone();
        tokio::spawn(async move {
            match resolver.resolve(&token).await {
                Ok(user) => {
                    tracing::debug!(authenticated = user.is_some(), "Session resolved");
                    handle.resolve(user);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Session resolution failed, treating as signed out");
                    handle.resolve(None);
                }
            }
        });
    }

    pub async fn forget(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops expired, anonymous and idle sessions. Returns how many went.
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, entry| {
            !(entry.is_expired(now)
                || entry.is_anonymous()
                || entry.last_seen.elapsed() >= self.idle_timeout)
        });

        before - sessions.len()
    }

    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        let every = every.max(Duration::from_secs(1));
        tokio::spawn(async move {
            tracing::info!(every_secs = every.as_secs(), "Session sweeper started");
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let removed = self.sweep().await;
                if removed > 0 {
                    let remaining = self.len().await;
                    tracing::debug!(removed, remaining, "Swept sessions");
                }
            }
        })
    }
}
