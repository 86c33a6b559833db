//! Comment entity - a reply on a community post.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Comment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comments")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the comment
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Post being replied to
    pub post_id: String,
    /// Commenter uid
    pub user_id: String,
    /// Commenter display name at comment time
    pub author_name: String,
    /// Commenter avatar URL at comment time
    pub author_avatar: String,
    /// Body text
    pub content: String,
    /// When the comment was written
    pub created_at: DateTimeUtc,
}

/// `Comment` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
