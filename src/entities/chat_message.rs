//! Chat message entity - append-only lines of a support thread.

use super::sea_orm_active_enums::ChatSender;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Chat message database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat_messages")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Thread owner, see `chat::Model::user_id`
    pub chat_user_id: String,
    pub sender: ChatSender,
    pub text: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
