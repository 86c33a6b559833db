//! Caller identity and the admin guard.
//!
//! Authentication happens in front of this service; the fronting layer passes
//! the signed-in account id as `x-user-id`.

use super::{AppState, error::ApiError};
use crate::errors::Error;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

/// Header carrying the authenticated account id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Account id of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

impl Caller {
    /// Fails unless the caller is `uid`.
    pub fn ensure_is(&self, uid: &str) -> Result<(), ApiError> {
        if self.0 == uid {
            Ok(())
        } else {
            Err(Error::Forbidden {
                message: "cannot act on another account".to_string(),
            }
            .into())
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Self(v.to_string()))
            .ok_or_else(|| {
                Error::Unauthorized {
                    message: format!("missing {USER_ID_HEADER} header"),
                }
                .into()
            })
    }
}

type HmacSha256 = Hmac<Sha256>;

/// Compares two tokens in constant time.
///
/// Both sides are reduced to an HMAC keyed by the expected token, so the
/// comparison length never depends on the presented value.
fn token_matches(presented: &str, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    let Ok(mut reference) = HmacSha256::new_from_slice(expected.as_bytes()) else {
        return false;
    };
    reference.update(expected.as_bytes());
    let tag = reference.finalize().into_bytes();

    let Ok(mut candidate) = HmacSha256::new_from_slice(expected.as_bytes()) else {
        return false;
    };
    candidate.update(presented.as_bytes());
    candidate.verify_slice(&tag).is_ok()
}

/// Rejects requests without `Authorization: Bearer <admin token>`.
pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token_matches(token, &state.admin_token) => next.run(request).await,
        _ => {
            warn!(path = %request.uri().path(), "Rejected admin request");
            ApiError(Error::Unauthorized {
                message: "admin token required".to_string(),
            })
            .into_response()
        }
    }
}
