//! Donation entity - the append-only donation ledger.
//!
//! A row is written once per confirmed payment and never updated afterwards.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Donation database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "donations")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the donation
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Campaign that received the money
    pub campaign_id: String,
    /// Donor account id, empty for guests
    pub user_id: String,
    /// Display name, anonymised when `is_anonymous` is set
    pub fullname: String,
    /// Gateway-reported amount
    pub amount: i64,
    /// Whether the donor asked to stay anonymous
    pub is_anonymous: bool,
    /// When the payment was booked
    pub donation_date: DateTimeUtc,
    /// Gateway payment-link id
    #[sea_orm(unique)]
    pub transaction_id: String,
    /// Order code the payment was correlated through
    pub order_code: i64,
}

/// `Donation` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
