//! Organ pledge entity. Owned by a donor account.
//!
//! `is_available` is not flipped automatically when a match is created; the
//! availability update endpoint is the explicit compensating operation.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organ_pledges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Always forced to the creating caller's id, never taken from input.
    pub donor_id: String,
    pub organ_type: String,
    pub donation_type: String,
    pub is_available: bool,
    pub medical_notes: Option<String>,
    pub approved_by: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::DonorId",
        to = "super::user::Column::Id"
    )]
    Donor,
    #[sea_orm(has_many = "super::organ_match::Entity")]
    Matches,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donor.def()
    }
}

impl Related<super::organ_match::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Matches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
