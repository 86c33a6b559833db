//! Notification entity.
//!
//! A row with `user_id = None` is a broadcast: it is shown to every user who
//! registered before it was created. Read state of broadcasts lives in
//! `notification_reads`; direct notifications use the `read` column.

use super::sea_orm_active_enums::NotificationKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the notification
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Recipient uid, `None` for broadcasts
    pub user_id: Option<String>,
    /// Trigger
    pub kind: NotificationKind,
    /// Text shown to the user
    pub message: String,
    /// Read flag for direct notifications
    pub read: bool,
    /// In-app link to follow
    pub link: Option<String>,
    /// When the notification was created
    pub created_at: DateTimeUtc,
}

/// `Notification` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
