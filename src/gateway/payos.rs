//! PayOS merchant API client.

use super::{
    CheckoutLink, PaymentGateway, PaymentRequest, SUCCESS_CODE, WebhookEnvelope,
    checksum::ChecksumKey,
};
use crate::config::settings::PayOsCredentials;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Gateway implementation backed by the PayOS REST API.
#[derive(Debug, Clone)]
pub struct PayOsClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    api_key: String,
    checksum: ChecksumKey,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateLinkBody<'a> {
    order_code: i64,
    amount: i64,
    description: &'a str,
    cancel_url: &'a str,
    return_url: &'a str,
    signature: String,
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    code: String,
    #[serde(default)]
    desc: String,
    data: Option<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateLinkData {
    checkout_url: String,
    payment_link_id: String,
}

impl PayOsClient {
    /// Builds a client for `base_url` (e.g. `https://api-merchant.payos.vn`).
    pub fn new(base_url: &str, credentials: &PayOsCredentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: credentials.client_id.clone(),
            api_key: credentials.api_key.clone(),
            checksum: ChecksumKey::new(credentials.checksum_key.clone()),
        })
    }
}

fn gateway_error(e: &reqwest::Error) -> Error {
    Error::Gateway {
        message: e.to_string(),
    }
}

#[async_trait]
impl PaymentGateway for PayOsClient {
    #[instrument(skip(self, request), fields(order_code = request.order_code))]
    async fn create_payment_link(&self, request: &PaymentRequest) -> Result<CheckoutLink> {
        let body = CreateLinkBody {
            order_code: request.order_code,
            amount: request.amount,
            description: &request.description,
            cancel_url: &request.cancel_url,
            return_url: &request.return_url,
            signature: self.checksum.sign_payment_request(request)?,
        };

        let response: ApiResponse<CreateLinkData> = self
            .http
            .post(format!("{}/v2/payment-requests", self.base_url))
            .header("x-client-id", &self.client_id)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| gateway_error(&e))?
            .error_for_status()
            .map_err(|e| gateway_error(&e))?
            .json()
            .await
            .map_err(|e| gateway_error(&e))?;

        if response.code != SUCCESS_CODE {
            warn!(code = %response.code, desc = %response.desc, "Gateway refused payment link");
            return Err(Error::Gateway {
                message: response.desc,
            });
        }
        let data = response.data.ok_or_else(|| Error::Gateway {
            message: "response without data".to_string(),
        })?;

        info!(payment_link_id = %data.payment_link_id, "Created payment link");
        Ok(CheckoutLink {
            checkout_url: data.checkout_url,
            payment_link_id: data.payment_link_id,
        })
    }

    fn verify_webhook(&self, envelope: &WebhookEnvelope) -> Result<()> {
        self.checksum.verify_data(&envelope.data, &envelope.signature)?;
        debug!("Webhook signature verified");
        Ok(())
    }
}
