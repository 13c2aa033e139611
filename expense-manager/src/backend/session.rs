//! Session gate: maps the `sid` cookie to an authenticated `UserId`.
//!
//! Ledgers never see sessions. Handlers that need a caller take an
//! [`AuthUser`], which rejects the request before the handler body runs.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use rand::RngCore;

use super::error::ApiError;
use super::AppState;
use crate::domain::UserId;

pub const SESSION_COOKIE: &str = "sid";
const TOKEN_BYTES: usize = 32;

pub trait SessionGate: Send + Sync {
    /// Starts a session and returns its opaque token.
    fn open(&self, user_id: UserId) -> String;

    fn resolve(&self, token: &str) -> Option<UserId>;

    fn close(&self, token: &str);
}

struct Session {
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

/// Process-local session table. Sessions do not survive a restart.
///
/// Each session lives for a fixed `ttl` from login. Expired entries stop
/// resolving immediately and are swept from the table on the next `open`.
pub struct InMemorySessions {
    sessions: RwLock<HashMap<String, Session>>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
}

impl InMemorySessions {
    pub fn new(clock: Arc<dyn Clock>, ttl: TimeDelta) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            clock,
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionGate for InMemorySessions {
    fn open(&self, user_id: UserId) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let now = self.clock.utc();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        let swept = before - sessions.len();
        if swept > 0 {
            tracing::debug!(swept, "expired sessions removed");
        }
        sessions.insert(token.clone(), Session { user_id, expires_at });
        token
    }

    fn resolve(&self, token: &str) -> Option<UserId> {
        let now = self.clock.utc();
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .filter(|session| session.expires_at > now)
            .map(|session| session.user_id)
    }

    fn close(&self, token: &str) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        session_token(&parts.headers)
            .and_then(|token| state.sessions.resolve(token))
            .map(AuthUser)
            .ok_or(ApiError::Unauthenticated)
    }
}

pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}

pub fn session_cookie(token: &str, ttl: TimeDelta, secure: bool) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        ttl.num_seconds(),
        secure_flag(secure)
    )
}

pub fn expired_session_cookie(secure: bool) -> String {
    format!(
        "{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
        secure_flag(secure)
    )
}

fn secure_flag(secure: bool) -> &'static str {
    if secure {
        "; Secure"
    } else {
        ""
    }
}
