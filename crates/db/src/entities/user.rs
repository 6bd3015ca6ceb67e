//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    pub username_lower: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 credential hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// API token for bearer authentication
    #[sea_orm(unique, nullable)]
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// Has this account completed email verification?
    #[sea_orm(default_value = false)]
    pub is_verified: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Grants this user has handed out.
    #[sea_orm(has_many = "super::shared_access::Entity")]
    OutgoingGrants,
}

impl Related<super::shared_access::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OutgoingGrants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
