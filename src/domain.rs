//! Shared vocabulary for roles, organ types and workflow state.
//!
//! Status is a plain tagged value. The service deliberately does not enforce
//! a transition graph: any doctor/admin may write any status at any time, and
//! the intended pending -> approved|rejected -> matched -> completed ordering
//! is documentation, not a guard.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Account role. New accounts start with no role; the role column stays NULL
/// until the holder picks one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Donor,
    Doctor,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "patient" => Some(Role::Patient),
            "donor" => Some(Role::Donor),
            "doctor" => Some(Role::Doctor),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Donor => "donor",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
        }
    }

    /// Doctors and admins share most review/approval privileges.
    pub fn is_medical_staff(self) -> bool {
        matches!(self, Role::Doctor | Role::Admin)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganType {
    Heart,
    Kidney,
    Liver,
    Lung,
    Pancreas,
    Cornea,
}

impl OrganType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "heart" => Some(OrganType::Heart),
            "kidney" => Some(OrganType::Kidney),
            "liver" => Some(OrganType::Liver),
            "lung" => Some(OrganType::Lung),
            "pancreas" => Some(OrganType::Pancreas),
            "cornea" => Some(OrganType::Cornea),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrganType::Heart => "heart",
            OrganType::Kidney => "kidney",
            OrganType::Liver => "liver",
            OrganType::Lung => "lung",
            OrganType::Pancreas => "pancreas",
            OrganType::Cornea => "cornea",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "critical" => Some(Priority::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationType {
    Living,
    Posthumous,
}

impl DonationType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "living" => Some(DonationType::Living),
            "posthumous" => Some(DonationType::Posthumous),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DonationType::Living => "living",
            DonationType::Posthumous => "posthumous",
        }
    }
}

/// Workflow status shared by organ requests and organ matches. The two entity
/// kinds progress independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Pending,
    Approved,
    Rejected,
    Matched,
    Completed,
}

impl WorkflowStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(WorkflowStatus::Pending),
            "approved" => Some(WorkflowStatus::Approved),
            "rejected" => Some(WorkflowStatus::Rejected),
            "matched" => Some(WorkflowStatus::Matched),
            "completed" => Some(WorkflowStatus::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Pending => "pending",
            WorkflowStatus::Approved => "approved",
            WorkflowStatus::Rejected => "rejected",
            WorkflowStatus::Matched => "matched",
            WorkflowStatus::Completed => "completed",
        }
    }
}

/// Current unix time in milliseconds, used for created_at/updated_at columns.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
