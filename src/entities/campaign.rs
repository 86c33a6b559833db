//! Campaign entity - a fundraising project run by an organization.
//!
//! `raised` and `donors` are derived aggregates. They start at zero and are only
//! ever changed by the ledger writer through `col = col + delta` updates, so the
//! values always equal the totals of the campaign's donation rows.

use super::{image_list::ImageList, sea_orm_active_enums::ModerationStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Campaign database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "campaigns")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the campaign
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Headline shown on listings
    pub title: String,
    /// Long-form story
    pub description: String,
    /// Fundraising target
    pub goal: i64,
    /// Running total of confirmed donations
    pub raised: i64,
    /// Number of confirmed donations
    pub donors: i64,
    /// Owning organization, if any
    pub organization_id: Option<String>,
    /// Review state
    pub status: ModerationStatus,
    /// Listing category (e.g. "Giáo dục")
    pub category: String,
    /// Cover image URL
    pub image: String,
    /// Additional story images
    pub story_images: ImageList,
    /// When the campaign was submitted
    pub date_created: DateTimeUtc,
    /// When fundraising closes
    pub date_end: DateTimeUtc,
}

/// `Campaign` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
