//! Shared access entity: a directed owner-to-grantee gallery grant.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shared_access")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Gallery owner granting access.
    pub owner_id: String,

    /// User receiving delegated access.
    pub grantee_id: String,

    /// Display name used for the grantee's uploads and comments,
    /// e.g. "Mom".
    pub alias: String,

    /// May the grantee upload into the owner's gallery?
    #[sea_orm(default_value = true)]
    pub can_upload: bool,

    /// May the grantee comment on the owner's media?
    #[sea_orm(default_value = true)]
    pub can_comment: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::GranteeId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Grantee,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
