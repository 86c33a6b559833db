//! Organization request entity - an account's application to become an organization.

use super::sea_orm_active_enums::ModerationStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Organization request database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organization_requests")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the request
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Applicant uid
    pub user_id: String,
    /// Proposed organization name
    pub organization_name: String,
    /// Proposed description
    pub description: String,
    /// Proposed logo URL
    pub logo: String,
    /// URL of the uploaded registration document
    pub document: String,
    /// Review state
    pub status: ModerationStatus,
    /// When the request was submitted
    pub created_at: DateTimeUtc,
}

/// `OrganizationRequest` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
