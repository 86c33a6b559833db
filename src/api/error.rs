//! Mapping of [`Error`] onto HTTP responses.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// Error returned by JSON handlers, rendered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

/// Result type of JSON handlers.
pub type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Status code an error is reported with.
#[must_use]
pub fn status_for(e: &Error) -> StatusCode {
    match e {
        Error::Validation { .. } | Error::InvalidAmount { .. } | Error::Json(_) => {
            StatusCode::BAD_REQUEST
        }
        Error::Unauthorized { .. } | Error::SignatureMismatch => StatusCode::UNAUTHORIZED,
        Error::Forbidden { .. } => StatusCode::FORBIDDEN,
        Error::CampaignNotFound { .. }
        | Error::OrganizationNotFound { .. }
        | Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::InvalidTransition { .. } | Error::Conflict { .. } => StatusCode::CONFLICT,
        Error::Gateway { .. } | Error::Storage { .. } | Error::Http(_) => StatusCode::BAD_GATEWAY,
        Error::Config { .. }
        | Error::Database(_)
        | Error::OrderCodeExhausted { .. }
        | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&Error::InvalidAmount { amount: -1 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&Error::NotFound {
                entity: "post",
                id: "x".to_string()
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&Error::InvalidTransition {
                entity: "campaign",
                id: "c".to_string(),
                status: "approved".to_string()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&Error::Gateway {
                message: "down".to_string()
            }),
            StatusCode::BAD_GATEWAY
        );
    }
}
