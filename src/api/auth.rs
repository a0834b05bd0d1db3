//! Authentication and caller resolution.
//!
//! Tokens are opaque server-side session handles carrying only the account
//! id. The account row (and therefore the role) is re-read from the store on
//! every gated call; a role claim is never trusted past identity resolution.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use parking_lot::RwLock;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use sha2::{Digest, Sha256};

use crate::db::entities::user;
use crate::domain::Role;
use crate::error::{Result, ServerError};

/// Hash a password with salt
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"organlink-server-salt:");
    hasher.update(password.as_bytes());
    let result = hasher.finalize();
    result.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Generate a secure random token
fn generate_token() -> String {
    let mut hasher = Sha256::new();

    // Use timestamp for uniqueness
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    hasher.update(timestamp.to_le_bytes());

    // Use thread ID
    let thread_id = std::thread::current().id();
    hasher.update(format!("{:?}", thread_id).as_bytes());

    // Use random-ish data from stack
    let stack_addr = &timestamp as *const _ as usize;
    hasher.update(stack_addr.to_le_bytes());

    let result = hasher.finalize();
    BASE64.encode(&result[..24])
}

/// An issued session
#[derive(Clone, Debug)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_at: SystemTime,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() > self.expires_at
    }
}

/// In-memory session-token store
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    token_duration: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            token_duration: Duration::from_secs(24 * 60 * 60), // 24 hours
        }
    }

    pub fn with_token_duration(mut self, duration: Duration) -> Self {
        self.token_duration = duration;
        self
    }

    /// Issue a new token for an account
    pub fn issue(&self, user_id: &str) -> String {
        let session = Session {
            token: generate_token(),
            user_id: user_id.to_string(),
            expires_at: SystemTime::now() + self.token_duration,
        };
        let token = session.token.clone();

        let mut sessions = self.sessions.write();
        sessions.insert(token.clone(), session);
        token
    }

    /// Resolve a token to the account id it was issued for
    pub fn resolve(&self, token: &str) -> Result<String> {
        let sessions = self.sessions.read();
        let session = sessions.get(token).ok_or(ServerError::AuthFailed)?;

        if session.is_expired() {
            return Err(ServerError::AuthFailed);
        }

        Ok(session.user_id.clone())
    }

    /// Revoke a token
    pub fn revoke(&self, token: &str) {
        let mut sessions = self.sessions.write();
        sessions.remove(token);
    }

    /// Cleanup expired sessions
    pub fn cleanup_expired(&self) {
        let mut sessions = self.sessions.write();
        sessions.retain(|_, s| !s.is_expired());
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Check email/password against the stored account. Inactive accounts cannot
/// authenticate.
pub async fn authenticate(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model> {
    let account = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?
        .ok_or(ServerError::AuthFailed)?;

    if !account.is_active || account.password_hash != hash_password(password) {
        return Err(ServerError::AuthFailed);
    }

    Ok(account)
}

/// Resolve the caller's current account from request headers.
///
/// Supports Bearer session tokens and Basic `email:password`. The account is
/// always fetched fresh so the role check sees current stored state.
pub async fn require_caller(
    db: &DatabaseConnection,
    sessions: &SessionStore,
    headers: &HeaderMap,
) -> Result<user::Model> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(ServerError::AuthRequired)?;

    if let Some(token) = auth_header.strip_prefix("Bearer ") {
        let user_id = sessions.resolve(token)?;
        return user::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServerError::NotFound("User not found".to_string()));
    }

    if let Some(encoded) = auth_header.strip_prefix("Basic ") {
        let decoded = BASE64.decode(encoded).map_err(|_| ServerError::AuthFailed)?;
        let credentials = String::from_utf8(decoded).map_err(|_| ServerError::AuthFailed)?;
        let (email, password) = credentials
            .split_once(':')
            .ok_or(ServerError::AuthFailed)?;
        return authenticate(db, email, password).await;
    }

    Err(ServerError::AuthFailed)
}

/// The caller's current role, if one has been selected.
pub fn role_of(account: &user::Model) -> Option<Role> {
    account.role.as_deref().and_then(Role::parse)
}
