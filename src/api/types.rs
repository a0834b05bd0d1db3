//! API request bodies and response views.
//!
//! Request fields are all optional and validated in the handlers so every
//! malformed input maps to a 400 with a message, never a framework rejection.
//! Response views are camelCase and never expose the password hash.

use serde::{Deserialize, Serialize};

use crate::db::entities::{medical_record, organ_match, organ_pledge, organ_request, user};
use crate::domain::{DonationType, OrganType, Priority, Role, WorkflowStatus};
use crate::error::{Result, ServerError};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleBody {
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    pub organ_type: Option<String>,
    pub priority: Option<String>,
    pub medical_reason: Option<String>,
    pub doctor_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RequestStatusBody {
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePledgeBody {
    pub organ_type: Option<String>,
    pub donation_type: Option<String>,
    pub medical_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PledgeAvailabilityBody {
    pub is_available: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchBody {
    pub request_id: Option<String>,
    pub pledge_id: Option<String>,
    pub compatibility_score: Option<i32>,
    pub recommended_by: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MatchStatusBody {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordBody {
    pub user_id: Option<String>,
    pub record_type: Option<String>,
    pub description: Option<String>,
    pub results: Option<String>,
    pub attachments: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusBody {
    pub is_active: Option<bool>,
}

// ============================================================================
// Response Types
// ============================================================================

/// Sanitized account view; the password hash is omitted structurally.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub phone_number: Option<String>,
    pub blood_type: Option<String>,
    pub medical_condition: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<user::Model> for UserView {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            first_name: m.first_name,
            last_name: m.last_name,
            role: m.role,
            phone_number: m.phone_number,
            blood_type: m.blood_type,
            medical_condition: m.medical_condition,
            address: m.address,
            emergency_contact: m.emergency_contact,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub id: String,
    pub patient_id: String,
    pub organ_type: String,
    pub priority: String,
    pub status: String,
    pub medical_reason: String,
    pub doctor_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub approved_by: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<organ_request::Model> for RequestView {
    fn from(m: organ_request::Model) -> Self {
        Self {
            id: m.id,
            patient_id: m.patient_id,
            organ_type: m.organ_type,
            priority: m.priority,
            status: m.status,
            medical_reason: m.medical_reason,
            doctor_notes: m.doctor_notes,
            rejection_reason: m.rejection_reason,
            approved_by: m.approved_by,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PledgeView {
    pub id: String,
    pub donor_id: String,
    pub organ_type: String,
    pub donation_type: String,
    pub is_available: bool,
    pub medical_notes: Option<String>,
    pub approved_by: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<organ_pledge::Model> for PledgeView {
    fn from(m: organ_pledge::Model) -> Self {
        Self {
            id: m.id,
            donor_id: m.donor_id,
            organ_type: m.organ_type,
            donation_type: m.donation_type,
            is_available: m.is_available,
            medical_notes: m.medical_notes,
            approved_by: m.approved_by,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub id: String,
    pub request_id: String,
    pub pledge_id: String,
    pub compatibility_score: Option<i32>,
    pub doctor_id: Option<String>,
    pub status: String,
    pub recommended_by: Option<String>,
    pub approved_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<organ_match::Model> for MatchView {
    fn from(m: organ_match::Model) -> Self {
        Self {
            id: m.id,
            request_id: m.request_id,
            pledge_id: m.pledge_id,
            compatibility_score: m.compatibility_score,
            doctor_id: m.doctor_id,
            status: m.status,
            recommended_by: m.recommended_by,
            approved_by: m.approved_by,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    pub id: String,
    pub user_id: String,
    pub record_type: String,
    pub description: String,
    pub results: Option<String>,
    pub doctor_id: Option<String>,
    pub attachments: Vec<String>,
    pub created_at: i64,
}

impl From<medical_record::Model> for RecordView {
    fn from(m: medical_record::Model) -> Self {
        let attachments = m
            .attachments
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default();
        Self {
            id: m.id,
            user_id: m.user_id,
            record_type: m.record_type,
            description: m.description,
            results: m.results,
            doctor_id: m.doctor_id,
            attachments,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub total_users: u64,
    pub active_donors: u64,
    pub pending_requests: u64,
    pub successful_matches: u64,
}

// ============================================================================
// Validation Helpers
// ============================================================================

/// Extract a required, non-blank string field.
pub fn require_field<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServerError::Validation(format!("{} is required", name)))
}

pub fn parse_organ_type(value: &Option<String>) -> Result<OrganType> {
    let raw = require_field(value, "organType")?;
    OrganType::parse(raw)
        .ok_or_else(|| ServerError::Validation(format!("Invalid organ type: {}", raw)))
}

pub fn parse_priority(value: &Option<String>) -> Result<Priority> {
    let raw = require_field(value, "priority")?;
    Priority::parse(raw).ok_or_else(|| ServerError::Validation(format!("Invalid priority: {}", raw)))
}

pub fn parse_donation_type(value: &Option<String>) -> Result<DonationType> {
    let raw = require_field(value, "donationType")?;
    DonationType::parse(raw)
        .ok_or_else(|| ServerError::Validation(format!("Invalid donation type: {}", raw)))
}

pub fn parse_status(value: &Option<String>) -> Result<WorkflowStatus> {
    let raw = require_field(value, "status")?;
    WorkflowStatus::parse(raw)
        .ok_or_else(|| ServerError::Validation(format!("Invalid status: {}", raw)))
}

pub fn parse_role(value: &Option<String>) -> Result<Role> {
    let raw = require_field(value, "role")?;
    Role::parse(raw).ok_or_else(|| ServerError::Validation("Invalid role".to_string()))
}
