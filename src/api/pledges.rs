//! Organ pledge handlers: create, list, availability update.

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
    parse_donation_type, parse_organ_type, CreatePledgeBody, PledgeAvailabilityBody, PledgeView,
};
use crate::db::entities::organ_pledge;
use crate::domain::{now_millis, Role};
use crate::error::{Result, ServerError};

/// POST /api/organ-pledges - Donors only; owner is forced to the caller
pub async fn create_pledge(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreatePledgeBody>,
) -> Result<Response> {
    let caller = require_caller(&state.db, &state.sessions, &headers).await?;
    if role_of(&caller) != Some(Role::Donor) {
        return Err(ServerError::Authorization(
            "Only donors can create organ pledges".to_string(),
        ));
    }

    let organ_type = parse_organ_type(&body.organ_type)?;
    let donation_type = parse_donation_type(&body.donation_type)?;

    let now = now_millis();
    let record = organ_pledge::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        // Owner is the authenticated caller, regardless of anything in the body
        donor_id: Set(caller.id.clone()),
        organ_type: Set(organ_type.as_str().to_string()),
        donation_type: Set(donation_type.as_str().to_string()),
        is_available: Set(true),
        medical_notes: Set(body.medical_notes.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(PledgeView::from(record))).into_response())
}

/// GET /api/organ-pledges - Donors see their own pledges; doctor/admin see
/// only pledges still marked available.
pub async fn list_pledges(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    let caller = require_caller(&state.db, &state.sessions, &headers).await?;

    let rows = match role_of(&caller) {
        Some(Role::Donor) => {
            organ_pledge::Entity::find()
                .filter(organ_pledge::Column::DonorId.eq(&caller.id))
                .order_by_desc(organ_pledge::Column::CreatedAt)
                .all(&state.db)
                .await?
        }
        Some(Role::Doctor) | Some(Role::Admin) => {
            organ_pledge::Entity::find()
                .filter(organ_pledge::Column::IsAvailable.eq(true))
                .order_by_desc(organ_pledge::Column::CreatedAt)
                .all(&state.db)
                .await?
        }
        _ => return Err(ServerError::Authorization("Access denied".to_string())),
    };

    let views: Vec<PledgeView> = rows.into_iter().map(PledgeView::from).collect();
    Ok(Json(views).into_response())
}

/// PATCH /api/organ-pledges/:id/availability - Doctor/admin only.
///
/// Explicit compensating operation for consuming (or releasing) a pledge;
/// match creation never flips availability on its own.
pub async fn update_pledge_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<PledgeAvailabilityBody>,
) -> Result<Response> {
    let caller = require_caller(&state.db, &state.sessions, &headers).await?;
    if !role_of(&caller).is_some_and(Role::is_medical_staff) {
        return Err(ServerError::Authorization(
            "Only doctors and admins can update pledge availability".to_string(),
        ));
    }

    let is_available = body
        .is_available
        .ok_or_else(|| ServerError::Validation("isAvailable is required".to_string()))?;

    let existing = organ_pledge::Entity::find_by_id(id.as_str())
        .one(&state.db)
        .await?
        .ok_or_else(|| ServerError::NotFound("Organ pledge not found".to_string()))?;

    let mut active: organ_pledge::ActiveModel = existing.into();
    active.is_available = Set(is_available);
    active.approved_by = Set(Some(caller.id.clone()));
    active.updated_at = Set(now_millis());
    let updated = active.update(&state.db).await?;

    Ok(Json(PledgeView::from(updated)).into_response())
}
