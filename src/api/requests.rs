//! Organ request handlers: create, list, status transition.

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
use super::types::{
    parse_organ_type, parse_priority, parse_status, require_field, CreateRequestBody, RequestStatusBody,
    RequestView,
};
use crate::db::entities::organ_request;
use crate::domain::{now_millis, Role, WorkflowStatus};
use crate::error::{Result, ServerError};

const MIN_MEDICAL_REASON_LEN: usize = 10;

/// POST /api/organ-requests - Patients only; owner is forced to the caller
pub async fn create_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateRequestBody>,
) -> Result<Response> {
    let caller = require_caller(&state.db, &state.sessions, &headers).await?;
    if role_of(&caller) != Some(Role::Patient) {
        return Err(ServerError::Authorization(
            "Only patients can create organ requests".to_string(),
        ));
    }

    let organ_type = parse_organ_type(&body.organ_type)?;
    let priority = parse_priority(&body.priority)?;
    let medical_reason = require_field(&body.medical_reason, "medicalReason")?;
    if medical_reason.len() < MIN_MEDICAL_REASON_LEN {
        return Err(ServerError::Validation(format!(
            "medicalReason must be at least {} characters",
            MIN_MEDICAL_REASON_LEN
        )));
    }

    let now = now_millis();
    let record = organ_request::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        // Owner is the authenticated caller, regardless of anything in the body
        patient_id: Set(caller.id.clone()),
        organ_type: Set(organ_type.as_str().to_string()),
        priority: Set(priority.as_str().to_string()),
        status: Set(WorkflowStatus::Pending.as_str().to_string()),
        medical_reason: Set(medical_reason.to_string()),
        doctor_notes: Set(body.doctor_notes.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(RequestView::from(record))).into_response())
}

/// GET /api/organ-requests - Patients see their own; doctor/admin see all
pub async fn list_requests(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    let caller = require_caller(&state.db, &state.sessions, &headers).await?;

    let rows = match role_of(&caller) {
        Some(Role::Patient) => {
            organ_request::Entity::find()
                .filter(organ_request::Column::PatientId.eq(&caller.id))
                .order_by_desc(organ_request::Column::CreatedAt)
                .all(&state.db)
                .await?
        }
        Some(Role::Doctor) | Some(Role::Admin) => {
            organ_request::Entity::find()
                .order_by_desc(organ_request::Column::CreatedAt)
                .all(&state.db)
                .await?
        }
        _ => return Err(ServerError::Authorization("Access denied".to_string())),
    };

    let views: Vec<RequestView> = rows.into_iter().map(RequestView::from).collect();
    Ok(Json(views).into_response())
}

/// PATCH /api/organ-requests/:id/status - Doctor/admin only.
///
/// Any valid status value is accepted at any time; the transition graph is
/// not enforced. The caller is recorded as the approver.
pub async fn update_request_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<RequestStatusBody>,
) -> Result<Response> {
    let caller = require_caller(&state.db, &state.sessions, &headers).await?;
    if !role_of(&caller).is_some_and(Role::is_medical_staff) {
        return Err(ServerError::Authorization(
            "Only doctors and admins can update request status".to_string(),
        ));
    }

    let status = parse_status(&body.status)?;

    let existing = organ_request::Entity::find_by_id(id.as_str())
        .one(&state.db)
        .await?
        .ok_or_else(|| ServerError::NotFound("Organ request not found".to_string()))?;

    let mut active: organ_request::ActiveModel = existing.into();
    active.status = Set(status.as_str().to_string());
    active.approved_by = Set(Some(caller.id.clone()));
    if let Some(notes) = body.notes.clone() {
        if status == WorkflowStatus::Rejected {
            active.rejection_reason = Set(Some(notes.clone()));
        }
        active.doctor_notes = Set(Some(notes));
    }
    active.updated_at = Set(now_millis());
    let updated = active.update(&state.db).await?;

    Ok(Json(RequestView::from(updated)).into_response())
}
