//! Medical record handlers.

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
use super::types::{require_field, CreateRecordBody, RecordView};
use crate::db::entities::medical_record;
use crate::domain::{now_millis, Role};
use crate::error::{Result, ServerError};

/// POST /api/medical-records - Doctor/admin only; the creating doctor is the
/// caller.
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateRecordBody>,
) -> Result<Response> {
    let caller = require_caller(&state.db, &state.sessions, &headers).await?;
    if !role_of(&caller).is_some_and(Role::is_medical_staff) {
        return Err(ServerError::Authorization(
            "Only medical professionals can create records".to_string(),
        ));
    }

    let user_id = require_field(&body.user_id, "userId")?;
    let record_type = require_field(&body.record_type, "recordType")?;
    let description = require_field(&body.description, "description")?;

    let attachments = body
        .attachments
        .as_ref()
        .and_then(|a| serde_json::to_string(a).ok());

    let record = medical_record::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        user_id: Set(user_id.to_string()),
        record_type: Set(record_type.to_string()),
        description: Set(description.to_string()),
        results: Set(body.results.clone()),
        doctor_id: Set(Some(caller.id.clone())),
        attachments: Set(attachments),
        created_at: Set(now_millis()),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(RecordView::from(record))).into_response())
}

/// GET /api/medical-records/:userId - The subject may read their own records;
/// doctor/admin may read anyone's.
pub async fn list_records_for_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let caller = require_caller(&state.db, &state.sessions, &headers).await?;
    if caller.id != user_id && !role_of(&caller).is_some_and(Role::is_medical_staff) {
        return Err(ServerError::Authorization("Access denied".to_string()));
    }

    let rows = medical_record::Entity::find()
        .filter(medical_record::Column::UserId.eq(&user_id))
        .order_by_desc(medical_record::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let views: Vec<RecordView> = rows.into_iter().map(RecordView::from).collect();
    Ok(Json(views).into_response())
}
