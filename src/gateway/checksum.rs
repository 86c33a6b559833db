//! Checksum signing for the PayOS API.
//!
//! Both directions use HMAC-SHA256 with the merchant checksum key over a
//! `key=value&key=value` string with keys in alphabetical order, hex encoded.

use super::PaymentRequest;
use crate::errors::{Error, Result};
use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Merchant checksum key.
#[derive(Clone)]
pub struct ChecksumKey(String);

impl fmt::Debug for ChecksumKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChecksumKey(***)")
    }
}

impl ChecksumKey {
    /// Wraps the raw key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(self.0.as_bytes()).map_err(|e| Error::Config {
            message: format!("invalid checksum key: {e}"),
        })
    }

    /// Hex HMAC of `payload`.
    pub fn sign(&self, payload: &str) -> Result<String> {
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Signature the gateway expects on a create-payment-link call.
    pub fn sign_payment_request(&self, request: &PaymentRequest) -> Result<String> {
        self.sign(&payment_request_payload(request))
    }

    /// Signature over a webhook `data` object.
    pub fn sign_data(&self, data: &Map<String, Value>) -> Result<String> {
        self.sign(&canonical_data_string(data))
    }

    /// Constant-time check of `signature` against `data`.
    pub fn verify_data(&self, data: &Map<String, Value>, signature: &str) -> Result<()> {
        let expected = hex::decode(signature.trim()).map_err(|_| Error::SignatureMismatch)?;
        let mut mac = self.mac()?;
        mac.update(canonical_data_string(data).as_bytes());
        mac.verify_slice(&expected)
            .map_err(|_| Error::SignatureMismatch)
    }
}

/// The five signed fields of a payment request, alphabetical.
#[must_use]
pub fn payment_request_payload(request: &PaymentRequest) -> String {
    format!(
        "amount={}&cancelUrl={}&description={}&orderCode={}&returnUrl={}",
        request.amount,
        request.cancel_url,
        request.description,
        request.order_code,
        request.return_url
    )
}

fn field_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Nested values are signed as their JSON text
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// `key=value` pairs of `data` sorted by key and joined with `&`.
#[must_use]
pub fn canonical_data_string(data: &Map<String, Value>) -> String {
    let mut fields: Vec<(&String, &Value)> = data.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));
    fields
        .into_iter()
        .map(|(key, value)| format!("{key}={}", field_value(value)))
        .collect::<Vec<_>>()
        .join("&")
}
