//! Checkout, gateway webhook and upload endpoints.
//!
//! These three keep the response shapes the web client already consumes, so
//! they parse their bodies themselves instead of going through [`ApiError`].
//!
//! [`ApiError`]: super::error::ApiError

use super::AppState;
use crate::{
    core::{checkout, ledger::LedgerOutcome, upload, webhook},
    errors::{Error, Result},
};
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

#[derive(Debug, Deserialize)]
struct UploadBody {
    image: String,
}

/// `POST /api/payment/create-link`
pub async fn create_link(State(state): State<AppState>, body: Bytes) -> Response {
    let session = match serde_json::from_slice::<checkout::DonationIntent>(&body) {
        Ok(intent) => {
            checkout::create_payment_link(&state.db, state.gateway.as_ref(), &state.urls, intent)
                .await
        }
        Err(e) => Err(Error::from(e)),
    };

    match session {
        Ok(session) => (
            StatusCode::OK,
            Json(json!({ "paymentUrl": session.checkout_url })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to create payment link: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "message": "Không thể tạo link thanh toán",
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

async fn handle_webhook(state: &AppState, body: &[u8]) -> Result<webhook::WebhookOutcome> {
    let envelope = webhook::parse_envelope(body)?;
    webhook::process_webhook(&state.db, state.gateway.as_ref(), &envelope).await
}

/// `POST /webhook`
///
/// Always acknowledged with `200 OK`; the gateway would otherwise keep
/// redelivering payloads this service cannot act on. Failures are only logged.
pub async fn receive_webhook(State(state): State<AppState>, body: Bytes) -> (StatusCode, &'static str) {
    match handle_webhook(&state, &body).await {
        Ok(webhook::WebhookOutcome::Ledger(LedgerOutcome::Recorded(donation))) => {
            info!(donation_id = %donation.id, "Webhook booked donation");
        }
        Ok(outcome) => debug!(?outcome, "Webhook acknowledged without booking"),
        Err(e) => error!("Webhook processing failed: {}", e),
    }
    (StatusCode::OK, "OK")
}

/// `POST /api/upload`
pub async fn upload_file(State(state): State<AppState>, body: Bytes) -> Response {
    let uploaded = match serde_json::from_slice::<UploadBody>(&body) {
        Ok(body) => upload::upload_file(state.storage.as_ref(), &body.image).await,
        Err(e) => Err(Error::from(e)),
    };

    match uploaded {
        Ok(url) => (StatusCode::OK, Json(json!({ "url": url }))).into_response(),
        Err(e) => {
            error!("Upload failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
