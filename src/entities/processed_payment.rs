//! Processed payment entity - idempotency ledger keyed by gateway transaction id.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Processed payment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "processed_payments")]
pub struct Model {
    /// Gateway payment-link id
    #[sea_orm(primary_key, auto_increment = false)]
    pub transaction_id: String,
    /// Order code of the consumed pending donation
    pub order_code: i64,
    /// Donation row the payment produced
    pub donation_id: String,
    /// When the payment was booked
    pub processed_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
