//! Application state and account/identity handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde_json::json;
use uuid::Uuid;

use super::auth::{self, SessionStore};
use super::types::{parse_role, require_field, AuthResponse, LoginBody, RegisterBody, RoleBody, UserView};
use crate::db::entities::user;
use crate::domain::{now_millis, Role};
use crate::error::{Result, ServerError};

/// Application state shared across handlers
pub struct AppState {
    pub db: DatabaseConnection,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            sessions: SessionStore::new(),
        }
    }

    /// Create the bootstrap admin account if it does not exist yet.
    pub async fn ensure_admin_user(&self, email: &str, password: &str) -> Result<()> {
        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Ok(());
        }

        let now = now_millis();
        user::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            email: Set(email.to_string()),
            password_hash: Set(auth::hash_password(password)),
            role: Set(Some(Role::Admin.as_str().to_string())),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!("Bootstrap admin account created: {}", email);
        Ok(())
    }
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /api/auth/register - Create an account with no role selected yet
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterBody>,
) -> Result<Response> {
    let email = require_field(&body.email, "email")?.to_lowercase();
    if !email.contains('@') {
        return Err(ServerError::Validation("Invalid email address".to_string()));
    }
    let password = require_field(&body.password, "password")?;
    if password.len() < 6 {
        return Err(ServerError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ServerError::Validation(
            "User with this email already exists".to_string(),
        ));
    }

    let now = now_millis();
    let account = user::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        email: Set(email),
        password_hash: Set(auth::hash_password(password)),
        first_name: Set(body.first_name.clone()),
        last_name: Set(body.last_name.clone()),
        role: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    let token = state.sessions.issue(&account.id);
    let response = AuthResponse {
        message: "User registered successfully".to_string(),
        token,
        user: account.into(),
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginBody>,
) -> Result<Response> {
    let email = require_field(&body.email, "email")?.to_lowercase();
    let password = require_field(&body.password, "password")?;

    let account = auth::authenticate(&state.db, &email, password).await?;
    let token = state.sessions.issue(&account.id);

    let response = AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: account.into(),
    };
    Ok(Json(response).into_response())
}

/// GET /api/auth/user - Current account, re-read from the store
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    let caller = auth::require_caller(&state.db, &state.sessions, &headers).await?;
    Ok(Json(UserView::from(caller)).into_response())
}

/// PATCH /api/auth/role - First-login role selection.
///
/// Not a one-shot: calling again overwrites the previously selected role.
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<RoleBody>,
) -> Result<Response> {
    let caller = auth::require_caller(&state.db, &state.sessions, &headers).await?;
    let role = parse_role(&body.role)?;

    let mut active: user::ActiveModel = caller.into();
    active.role = Set(Some(role.as_str().to_string()));
    active.updated_at = Set(now_millis());
    let updated = active.update(&state.db).await?;

    Ok(Json(UserView::from(updated)).into_response())
}
