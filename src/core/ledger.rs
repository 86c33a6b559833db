//! Ledger writer - turns a confirmed payment into durable donation state.
//!
//! Everything for one payment happens in a single database transaction:
//! the donation row, the campaign and organization increments, the removal of
//! the staged pending donation and the processed-payment receipt. Returning
//! early with `?` drops the transaction, which rolls it back.

use crate::{
    core::donation::ANONYMOUS_DONOR_NAME,
    entities::{
        Campaign, CampaignColumn, Organization, OrganizationColumn, PendingDonation,
        PendingDonationColumn, ProcessedPayment, donation, pending_donation, processed_payment,
    },
    errors::{Error, Result},
    gateway::PaymentEvent,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{DatabaseTransaction, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// A payment the gateway has confirmed as paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedPayment {
    pub order_code: i64,
    /// Amount the gateway collected
    pub amount: i64,
    /// Gateway payment-link id
    pub transaction_id: String,
}

impl From<PaymentEvent> for ConfirmedPayment {
    fn from(event: PaymentEvent) -> Self {
        Self {
            order_code: event.order_code,
            amount: event.amount,
            transaction_id: event.payment_link_id,
        }
    }
}

/// What recording a payment did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOutcome {
    /// A new donation was booked
    Recorded(donation::Model),
    /// The transaction was booked by an earlier delivery
    AlreadyProcessed {
        transaction_id: String,
        donation_id: String,
    },
    /// No staged donation carries this order code
    UnknownOrder { order_code: i64 },
}

/// Name shown on the donation, anonymised on request or when none was given.
#[must_use]
pub fn donor_display_name(pending: &pending_donation::Model) -> String {
    let name = pending.customer_name.trim();
    if pending.is_anonymous || name.is_empty() {
        ANONYMOUS_DONOR_NAME.to_string()
    } else {
        name.to_string()
    }
}

async fn increment_campaign(txn: &DatabaseTransaction, campaign_id: &str, amount: i64) -> Result<()> {
    let result = Campaign::update_many()
        .col_expr(CampaignColumn::Raised, Expr::col(CampaignColumn::Raised).add(amount))
        .col_expr(CampaignColumn::Donors, Expr::col(CampaignColumn::Donors).add(1))
        .filter(CampaignColumn::Id.eq(campaign_id))
        .exec(txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::CampaignNotFound {
            id: campaign_id.to_string(),
        });
    }
    Ok(())
}

async fn increment_organization(
    txn: &DatabaseTransaction,
    organization_id: &str,
    amount: i64,
) -> Result<()> {
    let result = Organization::update_many()
        .col_expr(
            OrganizationColumn::TotalRaised,
            Expr::col(OrganizationColumn::TotalRaised).add(amount),
        )
        .filter(OrganizationColumn::Id.eq(organization_id))
        .exec(txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::OrganizationNotFound {
            id: organization_id.to_string(),
        });
    }
    Ok(())
}

/// Books `payment` exactly once.
///
/// Replays of an already booked transaction and payments for order codes that
/// were never staged are both acknowledged without effect, but reported as
/// different outcomes so the caller can log them differently.
#[instrument(skip(db, payment), fields(order_code = payment.order_code, transaction_id = %payment.transaction_id))]
pub async fn record_confirmed_payment(
    db: &DatabaseConnection,
    payment: ConfirmedPayment,
) -> Result<LedgerOutcome> {
    if payment.amount <= 0 {
        return Err(Error::InvalidAmount {
            amount: payment.amount,
        });
    }

    let txn = db.begin().await?;

    if let Some(done) = ProcessedPayment::find_by_id(payment.transaction_id.clone())
        .one(&txn)
        .await?
    {
        info!(donation_id = %done.donation_id, "Payment already booked, ignoring replay");
        return Ok(LedgerOutcome::AlreadyProcessed {
            transaction_id: done.transaction_id,
            donation_id: done.donation_id,
        });
    }

    let Some(pending) = PendingDonation::find()
        .filter(PendingDonationColumn::OrderCode.eq(payment.order_code))
        .one(&txn)
        .await?
    else {
        warn!("Paid webhook for an order that was never staged, possible lost pending record");
        return Ok(LedgerOutcome::UnknownOrder {
            order_code: payment.order_code,
        });
    };

    let campaign = Campaign::find_by_id(pending.campaign_id.clone())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::CampaignNotFound {
            id: pending.campaign_id.clone(),
        })?;

    if pending.amount != payment.amount {
        warn!(
            declared = pending.amount,
            paid = payment.amount,
            "Declared amount differs from paid amount, booking paid amount"
        );
    }

    let now = Utc::now();
    let booked = donation::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        campaign_id: Set(campaign.id.clone()),
        user_id: Set(pending.user_id.clone()),
        fullname: Set(donor_display_name(&pending)),
        amount: Set(payment.amount),
        is_anonymous: Set(pending.is_anonymous),
        donation_date: Set(now),
        transaction_id: Set(payment.transaction_id.clone()),
        order_code: Set(pending.order_code),
    }
    .insert(&txn)
    .await?;

    increment_campaign(&txn, &campaign.id, payment.amount).await?;
    if let Some(organization_id) = campaign.organization_id.as_deref() {
        increment_organization(&txn, organization_id, payment.amount).await?;
    }

    PendingDonation::delete_by_id(pending.id.clone())
        .exec(&txn)
        .await?;

    processed_payment::ActiveModel {
        transaction_id: Set(payment.transaction_id.clone()),
        order_code: Set(pending.order_code),
        donation_id: Set(booked.id.clone()),
        processed_at: Set(now),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(
        donation_id = %booked.id,
        campaign_id = %booked.campaign_id,
        amount = booked.amount,
        "Donation booked"
    );
    Ok(LedgerOutcome::Recorded(booked))
}
