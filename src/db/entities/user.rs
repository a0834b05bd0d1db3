//! Account entity. One table for all four roles; `role` stays NULL until the
//! account holder selects one.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    /// Salted SHA-256 hash; never serialized to clients.
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// One of patient/donor/doctor/admin, or NULL while unset.
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::organ_request::Entity")]
    OrganRequests,
    #[sea_orm(has_many = "super::organ_pledge::Entity")]
    OrganPledges,
    #[sea_orm(has_many = "super::medical_record::Entity")]
    MedicalRecords,
}

impl Related<super::organ_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrganRequests.def()
    }
}

impl Related<super::organ_pledge::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrganPledges.def()
    }
}

impl Related<super::medical_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MedicalRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
