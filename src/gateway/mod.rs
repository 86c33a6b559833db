//! Payment gateway seam.
//!
//! The checkout flow and the webhook receiver only talk to [`PaymentGateway`];
//! production wires in [`payos::PayOsClient`], tests a fake that signs with the
//! same [`checksum::ChecksumKey`].

/// HMAC-SHA256 checksums used by the gateway
pub mod checksum;
/// HTTP client for the PayOS merchant API
pub mod payos;

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status code the gateway uses for success, both in API responses and paid webhooks.
pub const SUCCESS_CODE: &str = "00";

/// A request for a hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub order_code: i64,
    pub amount: i64,
    pub description: String,
    pub return_url: String,
    pub cancel_url: String,
}

/// The hosted checkout page created for a [`PaymentRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLink {
    pub checkout_url: String,
    pub payment_link_id: String,
}

/// Raw webhook body as posted by the gateway.
///
/// `data` is kept as a JSON object because the checksum covers every field the
/// gateway sends, including ones this service never reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    pub code: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub success: bool,
    pub data: Map<String, Value>,
    pub signature: String,
}

impl WebhookEnvelope {
    /// Whether the gateway reports the payment as paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// Fields of a verified webhook the ledger needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEvent {
    pub order_code: i64,
    /// Amount actually paid, authoritative over the declared one
    pub amount: i64,
    pub payment_link_id: String,
}

/// Operations the platform needs from a payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a hosted checkout page for `request`.
    async fn create_payment_link(&self, request: &PaymentRequest) -> Result<CheckoutLink>;

    /// Checks the envelope's signature over its `data` object.
    ///
    /// Fails with [`crate::errors::Error::SignatureMismatch`] when the checksum
    /// does not match; callers must not read `data` before this succeeds.
    fn verify_webhook(&self, envelope: &WebhookEnvelope) -> Result<()>;
}

/// Extracts the payment fields from an already verified `data` object.
pub fn parse_payment_event(data: &Map<String, Value>) -> Result<PaymentEvent> {
    Ok(serde_json::from_value(Value::Object(data.clone()))?)
}
