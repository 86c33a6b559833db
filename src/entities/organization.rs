//! Organization entity - a charity account that runs campaigns.
//!
//! `total_raised` is incremented in the same transaction as its campaigns'
//! `raised`, which keeps it equal to their sum.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Organization database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organizations")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the organization
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name
    pub name: String,
    /// About text
    pub description: String,
    /// Logo URL
    pub logo: String,
    /// Owning account uid
    pub user_id: String,
    /// Number of campaigns created by this organization
    pub campaign_count: i64,
    /// Sum of `raised` over the organization's campaigns
    pub total_raised: i64,
    /// When the organization was registered
    pub created_at: DateTimeUtc,
}

/// `Organization` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
