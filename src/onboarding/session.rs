//! Session registry: one [`MemoryStore`] per browser session.
//!
//! A session is registered on its first write, refreshed on every request
//! that presents its cookie and discarded once idle past the configured
//! timeout. Read-only visits never allocate a session.

use std::collections::HashMap;
use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::model::OnboardingRecord;
use super::store::MemoryStore;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "onboarding_session";

struct Session {
    store: MemoryStore,
    last_seen: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            last_seen: Utc::now(),
        }
    }
}

/// Identifier of a resolved session, stored in request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// All live sessions.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Session>>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        })
    }

    /// Touch the session named by `presented` if it is live, otherwise hand
    /// out a fresh id. Fresh ids are not registered until the first write.
    ///
    /// Returns the session id and whether it is already registered.
    pub async fn resolve(&self, presented: Option<Uuid>) -> (SessionId, bool) {
        if let Some(id) = presented {
            let mut sessions = self.sessions.write().await;
            if let Some(session) = sessions.get_mut(&id) {
                session.last_seen = Utc::now();
                return (SessionId(id), true);
            }
            debug!(session = %id, "Unknown or expired session presented");
        }
        (SessionId(Uuid::new_v4()), false)
    }

    pub async fn contains(&self, id: SessionId) -> bool {
        self.sessions.read().await.contains_key(&id.0)
    }

    /// Run `f` against the session's store without registering it. Unknown
    /// sessions read as an empty store.
    pub async fn read<R>(&self, id: SessionId, f: impl FnOnce(&MemoryStore) -> R) -> R {
        let sessions = self.sessions.read().await;
        match sessions.get(&id.0) {
            Some(session) => f(&session.store),
            None => f(&MemoryStore::new()),
        }
    }

    /// Snapshot of the session's record.
    pub async fn snapshot(&self, id: SessionId) -> OnboardingRecord {
        self.read(id, |store| store.record().clone()).await
    }

    /// Run `f` against the session's store under the write lock, registering
    /// the session on first use.
    pub async fn with_store<R>(&self, id: SessionId, f: impl FnOnce(&mut MemoryStore) -> R) -> R {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(id.0).or_insert_with(|| {
            info!(session = %id, "Onboarding session started");
            Session::new()
        });
        session.last_seen = Utc::now();
        f(&mut session.store)
    }

    /// Drop sessions idle longer than the timeout. Returns how many went.
    pub async fn expire_idle(&self) -> usize {
        let cutoff = Utc::now() - self.idle_timeout;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, s| {
            let keep = s.last_seen > cutoff;
            if !keep {
                debug!(session = %id, "Session expired");
            }
            keep
        });
        let expired = before - sessions.len();
        if expired > 0 {
            info!(count = expired, "Expired idle onboarding sessions");
        }
        expired
    }
}

/// Spawn a background task that periodically expires idle sessions.
pub fn spawn_expiry_task(
    registry: Arc<SessionRegistry>,
    every: std::time::Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            registry.expire_idle().await;
        }
    })
}

/// The session id carried by the request's cookies, if well-formed.
pub fn session_from_jar(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// Cookie handed out when a session is registered.
pub fn session_cookie(id: SessionId) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
