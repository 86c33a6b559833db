//! Enumerations stored as text columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review state shared by campaigns, posts and organization requests.
///
/// `Pending` is the only non-terminal state; moderation moves a record to
/// `Approved` or `Rejected` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    /// Awaiting an admin decision
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Accepted and publicly visible
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Declined
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl ModerationStatus {
    /// Lower-case label, identical to the stored value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A post or organization request was reviewed
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Someone liked the recipient's post
    #[sea_orm(string_value = "like")]
    Like,
    /// Someone commented on the recipient's post
    #[sea_orm(string_value = "comment")]
    Comment,
    /// A campaign was approved (broadcast)
    #[sea_orm(string_value = "new_campaign")]
    NewCampaign,
    /// News was published (broadcast)
    #[sea_orm(string_value = "new_news")]
    NewNews,
}

/// Account role. Organization accounts own exactly one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Platform administrator
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Regular donor
    #[sea_orm(string_value = "user")]
    User,
    /// Registered charity organization
    #[sea_orm(string_value = "organization")]
    Organization,
}

/// Author side of a support chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ChatSender {
    /// The account owning the thread
    #[sea_orm(string_value = "user")]
    User,
    /// Platform support
    #[sea_orm(string_value = "admin")]
    Admin,
}
