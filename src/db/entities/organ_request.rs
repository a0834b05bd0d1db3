//! Organ request entity. Owned by a patient account; reviewed by doctor/admin.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organ_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Always forced to the creating caller's id, never taken from input.
    pub patient_id: String,
    pub organ_type: String,
    pub priority: String,
    pub status: String,
    pub medical_reason: String,
    pub doctor_notes: Option<String>,
    pub rejection_reason: Option<String>,
    /// Last doctor/admin who wrote the status.
    pub approved_by: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::PatientId",
        to = "super::user::Column::Id"
    )]
    Patient,
    #[sea_orm(has_many = "super::organ_match::Entity")]
    Matches,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Patient.def()
    }
}

impl Related<super::organ_match::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Matches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
