//! Payment link issuing - stages a donation intent and asks the gateway for a
//! hosted checkout page.
//!
//! The staged [`pending_donation`] row is the only link between the checkout
//! and the webhook that later confirms it; the gateway echoes its `order_code`.

use crate::{
    core::{campaign, donation::ANONYMOUS_DONOR_NAME},
    entities::{PendingDonation, pending_donation},
    errors::{Error, Result},
    gateway::{PaymentGateway, PaymentRequest},
};
use chrono::Utc;
use sea_orm::{Set, SqlErr, prelude::*};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Order codes are the last six digits of a millisecond timestamp.
const ORDER_CODE_SPACE: i64 = 1_000_000;
/// How many successive codes are tried before giving up.
const MAX_ORDER_CODE_ATTEMPTS: u32 = 10;

/// Checkout form as submitted by the donor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationIntent {
    pub amount: i64,
    pub campaign_id: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Account id, absent for guest donors
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

/// Site URLs the gateway sends the donor back to.
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    pub public_base_url: String,
}

impl CheckoutUrls {
    pub fn new(public_base_url: &str) -> Self {
        Self {
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn return_url(&self, campaign_id: &str) -> String {
        format!(
            "{}/quyen-gop-thanh-cong?campaignId={campaign_id}",
            self.public_base_url
        )
    }

    pub fn cancel_url(&self, campaign_id: &str) -> String {
        format!("{}/du-an/{campaign_id}", self.public_base_url)
    }
}

/// A staged donation with its hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub pending_id: String,
    pub order_code: i64,
    pub checkout_url: String,
    pub payment_link_id: String,
}

/// Six-digit order code derived from a millisecond timestamp. Never zero.
#[must_use]
pub fn order_code_from_millis(millis: i64) -> i64 {
    match millis.rem_euclid(ORDER_CODE_SPACE) {
        0 => 1,
        code => code,
    }
}

fn next_order_code(code: i64) -> i64 {
    code % (ORDER_CODE_SPACE - 1) + 1
}

fn validate(intent: &DonationIntent) -> Result<()> {
    if intent.amount <= 0 {
        return Err(Error::InvalidAmount {
            amount: intent.amount,
        });
    }
    if intent.campaign_id.trim().is_empty() {
        return Err(Error::Validation {
            message: "campaignId is required".to_string(),
        });
    }
    Ok(())
}

/// Inserts the pending row, moving to the next code while `first_code` is taken.
async fn stage_pending(
    db: &DatabaseConnection,
    intent: &DonationIntent,
    first_code: i64,
) -> Result<pending_donation::Model> {
    let customer_name = intent
        .customer_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(ANONYMOUS_DONOR_NAME)
        .to_string();

    let mut order_code = first_code;
    for attempt in 1..=MAX_ORDER_CODE_ATTEMPTS {
        let staged = pending_donation::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            order_code: Set(order_code),
            campaign_id: Set(intent.campaign_id.clone()),
            user_id: Set(intent.user_id.clone().unwrap_or_default()),
            customer_name: Set(customer_name.clone()),
            amount: Set(intent.amount),
            is_anonymous: Set(intent.is_anonymous),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await;

        match staged {
            Ok(model) => return Ok(model),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                debug!(order_code, attempt, "Order code already staged, trying next");
                order_code = next_order_code(order_code);
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(Error::OrderCodeExhausted {
        attempts: MAX_ORDER_CODE_ATTEMPTS,
    })
}

/// Stages `intent` and creates its checkout page.
///
/// When the gateway refuses, the staged row is removed again so no pending
/// record outlives a checkout that never existed.
#[instrument(skip(db, gateway, urls, intent), fields(campaign_id = %intent.campaign_id, amount = intent.amount))]
pub async fn create_payment_link(
    db: &DatabaseConnection,
    gateway: &dyn PaymentGateway,
    urls: &CheckoutUrls,
    intent: DonationIntent,
) -> Result<CheckoutSession> {
    validate(&intent)?;
    if campaign::get_campaign(db, &intent.campaign_id)
        .await?
        .is_none()
    {
        return Err(Error::CampaignNotFound {
            id: intent.campaign_id,
        });
    }

    let first_code = order_code_from_millis(Utc::now().timestamp_millis());
    let pending = stage_pending(db, &intent, first_code).await?;

    let request = PaymentRequest {
        order_code: pending.order_code,
        amount: pending.amount,
        description: format!("Quyen gop {}", pending.order_code),
        return_url: urls.return_url(&pending.campaign_id),
        cancel_url: urls.cancel_url(&pending.campaign_id),
    };

    let link = match gateway.create_payment_link(&request).await {
        Ok(link) => link,
        Err(e) => {
            warn!(order_code = pending.order_code, "Payment link failed, unstaging: {}", e);
            if let Err(cleanup) = PendingDonation::delete_by_id(pending.id.clone())
                .exec(db)
                .await
            {
                error!(order_code = pending.order_code, "Failed to unstage pending donation: {}", cleanup);
            }
            return Err(e);
        }
    };

    info!(
        order_code = pending.order_code,
        payment_link_id = %link.payment_link_id,
        "Donation staged"
    );
    Ok(CheckoutSession {
        pending_id: pending.id,
        order_code: pending.order_code,
        checkout_url: link.checkout_url,
        payment_link_id: link.payment_link_id,
    })
}
