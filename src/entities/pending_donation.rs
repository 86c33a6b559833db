//! Pending donation entity - a staged intent to donate awaiting gateway confirmation.
//!
//! Rows are created by the checkout flow and consumed (deleted) by the ledger
//! writer in the same transaction that books the donation. `order_code` is the
//! short numeric key the payment gateway echoes back in its webhook.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pending donation database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pending_donations")]
pub struct Model {
    /// Globally unique identifier of the intent
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Gateway correlation code, unique among staged intents
    #[sea_orm(unique)]
    pub order_code: i64,
    /// Campaign the donor is giving to
    pub campaign_id: String,
    /// Donor account id, empty for guests
    pub user_id: String,
    /// Name typed at checkout
    pub customer_name: String,
    /// Amount declared by the client (the gateway amount is authoritative)
    pub amount: i64,
    /// Whether the donor asked to stay anonymous
    pub is_anonymous: bool,
    /// When the intent was staged
    pub created_at: DateTimeUtc,
}

/// `PendingDonation` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
