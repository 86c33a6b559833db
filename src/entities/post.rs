//! Post entity - a community feed entry, visible once approved.

use super::{image_list::ImageList, sea_orm_active_enums::ModerationStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Post database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the post
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Author uid
    pub user_id: String,
    /// Author display name at posting time
    pub author_name: String,
    /// Author avatar URL at posting time
    pub author_avatar: String,
    /// Body text
    pub content: String,
    /// Attached image URLs
    pub images: ImageList,
    /// Number of comments, maintained with atomic increments
    pub comment_count: i64,
    /// Review state
    pub status: ModerationStatus,
    /// When the post was submitted
    pub created_at: DateTimeUtc,
}

/// `Post` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
