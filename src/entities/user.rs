//! User entity - profile of an authenticated account.
use super::sea_orm_active_enums::UserRole;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Auth-provider uid
    #[sea_orm(primary_key, auto_increment = false)]
    pub uid: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub phone_number: String,
    pub role: UserRole,
    /// Registration time; broadcasts older than this are not shown to the user
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
