//! Organ match entity, linking one request to one pledge.
//!
//! The compatibility score is supplied by the caller; this system does not
//! compute blood-type or organ compatibility. Match status and request status
//! progress independently.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organ_matches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub request_id: String,
    pub pledge_id: String,
    /// 0-100, externally supplied.
    pub compatibility_score: Option<i32>,
    /// Doctor/admin who created the match; forced to the caller's id.
    pub doctor_id: Option<String>,
    pub status: String,
    pub recommended_by: Option<String>,
    pub approved_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organ_request::Entity",
        from = "Column::RequestId",
        to = "super::organ_request::Column::Id"
    )]
    Request,
    #[sea_orm(
        belongs_to = "super::organ_pledge::Entity",
        from = "Column::PledgeId",
        to = "super::organ_pledge::Column::Id"
    )]
    Pledge,
}

impl Related<super::organ_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Request.def()
    }
}

impl Related<super::organ_pledge::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pledge.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
