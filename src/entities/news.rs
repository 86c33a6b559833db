//! News entity - articles published by admins.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// News database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "news")]
pub struct Model {
    /// Unique identifier for the article
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub category: String,
    /// Cover image URL
    pub image: String,
    pub summary: String,
    pub content: String,
    /// Publication time
    pub date: DateTimeUtc,
}

/// `News` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
