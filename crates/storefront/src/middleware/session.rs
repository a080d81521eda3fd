//! Session middleware configuration.
//!
//! Sessions live in process memory, in a bounded `moka` cache that drops
//! records after a week of inactivity or when capacity is reached. They hold
//! only per-visitor drafts: carts, wizard progress, locale, chat, and the
//! backend token of a signed-in customer. A restart signs everyone out and
//! empties carts. The session cookie is signed with a key derived from
//! `STOREFRONT_SESSION_SECRET`.

use std::time::Duration;

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use tower_sessions::{
    Expiry, Session, SessionManagerLayer, SessionStore,
    cookie::{Key, time::OffsetDateTime},
    service::SignedCookie,
    session::{Id, Record},
    session_store,
};

use crate::config::StorefrontConfig;
use crate::error::SessionExpired;
use crate::stores;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "dl_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Most sessions held at once.
pub const MAX_SESSIONS: u64 = 100_000;

/// In-memory session store with a size bound and idle eviction.
#[derive(Clone)]
pub struct SessionCache {
    records: Cache<Id, Record>,
}

impl SessionCache {
    /// Create a store holding at most `max_sessions` records, each dropped
    /// after `idle` without a write.
    #[must_use]
    pub fn new(max_sessions: u64, idle: Duration) -> Self {
        Self {
            records: Cache::builder()
                .max_capacity(max_sessions)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// Number of records currently held.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.records.entry_count()
    }

    /// Whether no records are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("sessions", &self.records.entry_count())
            .finish()
    }
}

#[async_trait]
impl SessionStore for SessionCache {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.records.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let Some(record) = self.records.get(session_id).await else {
            return Ok(None);
        };
        if record.expiry_date <= OffsetDateTime::now_utc() {
            self.records.invalidate(session_id).await;
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.invalidate(session_id).await;
        Ok(())
    }
}

/// Cookie signing key derived from the session secret.
fn signing_key(secret: &SecretString) -> Key {
    // SHA-512 yields the 64 bytes `Key` requires
    Key::from(Sha512::digest(secret.expose_secret().as_bytes()).as_slice())
}

/// Create the session layer with a bounded in-memory store and a signed
/// cookie.
#[must_use]
pub fn create_session_layer(
    config: &StorefrontConfig,
) -> SessionManagerLayer<SessionCache, SignedCookie> {
    let idle = Duration::from_secs(SESSION_EXPIRY_SECONDS.unsigned_abs());
    SessionManagerLayer::new(SessionCache::new(MAX_SESSIONS, idle))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(&config.session_secret))
}

/// Sign the customer out when a handler reports that the backend rejected
/// their token (see [`SessionExpired`]).
///
/// Must run inside the session layer.
pub async fn session_expiry_middleware(request: Request, next: Next) -> Response {
    let session = request.extensions().get::<Session>().cloned();
    let response = next.run(request).await;

    if response.extensions().get::<SessionExpired>().is_some()
        && let Some(session) = session
    {
        if let Err(e) = stores::clear_current_user(&session).await {
            tracing::error!(error = %e, "Failed to clear expired session user");
        }
        crate::error::clear_sentry_user();
    }

    response
}
