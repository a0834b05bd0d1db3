//! Admin handlers: user administration and aggregate statistics.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::auth::{require_caller, role_of};
use super::handlers::AppState;
use super::types::{parse_role, StatsView, UserStatusBody, UserView};
use crate::db::entities::{organ_match, organ_request, user};
use crate::domain::{now_millis, Role, WorkflowStatus};
use crate::error::{Result, ServerError};

fn require_admin(caller: &user::Model) -> Result<()> {
    if role_of(caller) != Some(Role::Admin) {
        return Err(ServerError::Authorization(
            "Admin access required".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/admin/users - All accounts, sanitized
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    let caller = require_caller(&state.db, &state.sessions, &headers).await?;
    require_admin(&caller)?;

    let rows = user::Entity::find()
        .order_by_desc(user::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let views: Vec<UserView> = rows.into_iter().map(UserView::from).collect();
    Ok(Json(views).into_response())
}

/// GET /api/admin/users/:role - Accounts filtered by role, sanitized
pub async fn list_users_by_role(
    State(state): State<Arc<AppState>>,
    Path(role): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let caller = require_caller(&state.db, &state.sessions, &headers).await?;
    require_admin(&caller)?;

    let role = parse_role(&Some(role))?;
    let rows = user::Entity::find()
        .filter(user::Column::Role.eq(role.as_str()))
        .order_by_desc(user::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let views: Vec<UserView> = rows.into_iter().map(UserView::from).collect();
    Ok(Json(views).into_response())
}

/// PATCH /api/admin/users/:id/status - Toggle an account's active flag
pub async fn update_user_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<UserStatusBody>,
) -> Result<Response> {
    let caller = require_caller(&state.db, &state.sessions, &headers).await?;
    require_admin(&caller)?;

    let is_active = body
        .is_active
        .ok_or_else(|| ServerError::Validation("isActive is required".to_string()))?;

    let existing = user::Entity::find_by_id(id.as_str())
        .one(&state.db)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

    let mut active: user::ActiveModel = existing.into();
    active.is_active = Set(is_active);
    active.updated_at = Set(now_millis());
    let updated = active.update(&state.db).await?;

    Ok(Json(UserView::from(updated)).into_response())
}

/// GET /api/admin/stats - All-time counters, recomputed on every call
pub async fn stats(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response> {
    let caller = require_caller(&state.db, &state.sessions, &headers).await?;
    require_admin(&caller)?;

    let total_users = user::Entity::find().count(&state.db).await?;
    let active_donors = user::Entity::find()
        .filter(user::Column::Role.eq(Role::Donor.as_str()))
        .count(&state.db)
        .await?;
    let pending_requests = organ_request::Entity::find()
        .filter(organ_request::Column::Status.eq(WorkflowStatus::Pending.as_str()))
        .count(&state.db)
        .await?;
    let successful_matches = organ_match::Entity::find()
        .filter(organ_match::Column::Status.eq(WorkflowStatus::Completed.as_str()))
        .count(&state.db)
        .await?;

    Ok(Json(StatsView {
        total_users,
        active_donors,
        pending_requests,
        successful_matches,
    })
    .into_response())
}
