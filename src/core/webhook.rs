//! Webhook receiver logic - authenticates gateway callbacks and hands paid
//! events to the ledger writer.

use crate::{
    core::ledger::{self, LedgerOutcome},
    errors::Result,
    gateway::{PaymentGateway, WebhookEnvelope, parse_payment_event},
};
use sea_orm::DatabaseConnection;
use tracing::{debug, instrument};

/// What handling a webhook did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A paid event reached the ledger
    Ledger(LedgerOutcome),
    /// Verified, but the status code is not "paid"
    Ignored { code: String },
}

/// Parses a raw webhook body.
pub fn parse_envelope(body: &[u8]) -> Result<WebhookEnvelope> {
    Ok(serde_json::from_slice(body)?)
}

/// Verifies `envelope` and books it when it reports a payment.
///
/// Nothing in `data` is read before the signature has been checked.
#[instrument(skip_all, fields(code = %envelope.code))]
pub async fn process_webhook(
    db: &DatabaseConnection,
    gateway: &dyn PaymentGateway,
    envelope: &WebhookEnvelope,
) -> Result<WebhookOutcome> {
    gateway.verify_webhook(envelope)?;

    if !envelope.is_paid() {
        debug!(desc = %envelope.desc, "Ignoring non-paid webhook");
        return Ok(WebhookOutcome::Ignored {
            code: envelope.code.clone(),
        });
    }

    let event = parse_payment_event(&envelope.data)?;
    let outcome = ledger::record_confirmed_payment(db, event.into()).await?;
    Ok(WebhookOutcome::Ledger(outcome))
}
