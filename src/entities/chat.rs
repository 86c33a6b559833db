//! Chat entity - one support thread per account.
//!
//! The unread counters are bumped with `col = col + 1` when the other side
//! writes and reset when the thread is read.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Support thread database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chats")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Account the thread belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// Display name when the thread was opened
    pub user_name: String,
    pub user_email: String,
    /// Text of the latest message
    pub last_message: String,
    /// Messages from the user the admin has not read
    pub unread_admin: i64,
    /// Messages from the admin the user has not read
    pub unread_user: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
