//! Server-side sessions keyed by a random cookie value.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cardiorisk_fhir::{PatientRecord, TokenResponse};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::form::FormController;

pub const SESSION_COOKIE: &str = "cardiorisk_session";

/// Everything the launch flow and the record page remember per browser.
#[derive(Clone, Default)]
pub struct Session {
    pub launch: Option<String>,
    /// OAuth `state` sent with the authorization request.
    pub oauth_state: Option<String>,
    pub token: Option<Arc<TokenResponse>>,
    pub record: Option<Arc<PatientRecord>>,
    pub form: Option<Arc<FormController>>,
}

struct Entry {
    session: Session,
    last_seen: Instant,
}

/// Sessions expire after `ttl` without a request and the store never holds
/// more than `max_sessions`; when full, the least recently seen is evicted.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Entry>>>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            inner: Arc::default(),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Start a fresh session, returning its id.
    pub async fn create(&self, session: Session) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut map = self.inner.write().await;

        let before = map.len();
        map.retain(|_, e| now.duration_since(e.last_seen) < self.ttl);
        if map.len() < before {
            debug!(expired = before - map.len(), "expired sessions dropped");
        }
        while map.len() >= self.max_sessions {
            let oldest = map.iter().min_by_key(|(_, e)| e.last_seen).map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    warn!(session = %oldest, "session store full, evicting");
                    map.remove(&oldest);
                }
                None => break,
            }
        }

        map.insert(id, Entry { session, last_seen: now });
        id
    }

    /// Live session by id; touching it extends its lifetime.
    pub async fn get(&self, id: Uuid) -> Option<Session> {
        let now = Instant::now();
        let mut map = self.inner.write().await;
        let entry = map.get_mut(&id)?;
        if now.duration_since(entry.last_seen) >= self.ttl {
            map.remove(&id);
            debug!(session = %id, "session expired");
            return None;
        }
        entry.last_seen = now;
        Some(entry.session.clone())
    }

    /// Apply `f` to the session; `false` if it does not exist.
    pub async fn update<F>(&self, id: Uuid, f: F) -> bool
    where
        F: FnOnce(&mut Session),
    {
        match self.inner.write().await.get_mut(&id) {
            Some(entry) => {
                f(&mut entry.session);
                entry.last_seen = Instant::now();
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Session referenced by the request cookie, if it is still known.
    pub async fn lookup(&self, jar: &CookieJar) -> Option<(Uuid, Session)> {
        let id = session_id(jar)?;
        self.get(id).await.map(|s| (id, s))
    }
}

pub fn session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
}

pub fn session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
