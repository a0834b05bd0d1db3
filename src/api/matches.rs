//! Organ match handlers: create, list potential matches, status transition.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use super::auth::{require_caller, role_of};
use super::handlers::AppState;
use super::types::{parse_status, require_field, CreateMatchBody, MatchStatusBody, MatchView};
use crate::db::entities::organ_match;
use crate::domain::{now_millis, Role, WorkflowStatus};
use crate::error::{Result, ServerError};

/// POST /api/organ-matches - Doctor/admin only.
///
/// Request/pledge ids are required syntactically; existence is left to the
/// foreign-key constraints.
pub async fn create_match(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateMatchBody>,
) -> Result<Response> {
    let caller = require_caller(&state.db, &state.sessions, &headers).await?;
    if !role_of(&caller).is_some_and(Role::is_medical_staff) {
        return Err(ServerError::Authorization(
            "Only doctors and admins can create matches".to_string(),
        ));
    }

    let request_id = require_field(&body.request_id, "requestId")?;
    let pledge_id = require_field(&body.pledge_id, "pledgeId")?;
    if let Some(score) = body.compatibility_score {
        if !(0..=100).contains(&score) {
            return Err(ServerError::Validation(
                "compatibilityScore must be between 0 and 100".to_string(),
            ));
        }
    }

    let now = now_millis();
    let record = organ_match::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        request_id: Set(request_id.to_string()),
        pledge_id: Set(pledge_id.to_string()),
        compatibility_score: Set(body.compatibility_score),
        // Creator is the authenticated caller, regardless of anything in the body
        doctor_id: Set(Some(caller.id.clone())),
        status: Set(WorkflowStatus::Pending.as_str().to_string()),
        recommended_by: Set(body.recommended_by.clone()),
        notes: Set(body.notes.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(MatchView::from(record))).into_response())
}

/// GET /api/organ-matches - Doctor/admin only. Pending matches, best
/// compatibility score first.
pub async fn list_matches(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    let caller = require_caller(&state.db, &state.sessions, &headers).await?;
    if !role_of(&caller).is_some_and(Role::is_medical_staff) {
        return Err(ServerError::Authorization(
            "Only doctors and admins can view matches".to_string(),
        ));
    }

    let rows = organ_match::Entity::find()
        .filter(organ_match::Column::Status.eq(WorkflowStatus::Pending.as_str()))
        .order_by_desc(organ_match::Column::CompatibilityScore)
        .all(&state.db)
        .await?;

    let views: Vec<MatchView> = rows.into_iter().map(MatchView::from).collect();
    Ok(Json(views).into_response())
}

/// PATCH /api/organ-matches/:id/status - Admin only. Records the caller as
/// the approver; request status is not cascaded.
pub async fn update_match_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<MatchStatusBody>,
) -> Result<Response> {
    let caller = require_caller(&state.db, &state.sessions, &headers).await?;
    if role_of(&caller) != Some(Role::Admin) {
        return Err(ServerError::Authorization(
            "Only admins can update match status".to_string(),
        ));
    }

    let status = parse_status(&body.status)?;

    let existing = organ_match::Entity::find_by_id(id.as_str())
        .one(&state.db)
        .await?
        .ok_or_else(|| ServerError::NotFound("Organ match not found".to_string()))?;

    let mut active: organ_match::ActiveModel = existing.into();
    active.status = Set(status.as_str().to_string());
    active.approved_by = Set(Some(caller.id.clone()));
    active.updated_at = Set(now_millis());
    let updated = active.update(&state.db).await?;

    Ok(Json(MatchView::from(updated)).into_response())
}
