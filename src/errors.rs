//! Unified error type for the donation platform.
//!
//! Every fallible operation in `core`, `gateway` and `storage` returns [`Result`].
//! The `api` layer decides which variants reach the client and with which status.

use thiserror::Error;

/// Application error.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings could not be read or are incomplete
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Database driver or query failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A monetary amount that must be strictly positive was not
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// Request payload failed boundary validation
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// Referenced campaign does not exist
    #[error("Campaign not found: {id}")]
    CampaignNotFound {
        /// Campaign id that was looked up
        id: String,
    },

    /// Referenced organization does not exist
    #[error("Organization not found: {id}")]
    OrganizationNotFound {
        /// Organization id that was looked up
        id: String,
    },

    /// Any other missing record
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record (e.g. `"post"`)
        entity: &'static str,
        /// Id that was looked up
        id: String,
    },

    /// Moderation decision on a record that is no longer pending
    #[error("{entity} {id} is already {status}")]
    InvalidTransition {
        /// Kind of record
        entity: &'static str,
        /// Record id
        id: String,
        /// Status the record is currently in
        status: String,
    },

    /// Request conflicts with existing state
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable reason
        message: String,
    },

    /// Payment gateway rejected the call or was unreachable
    #[error("Payment gateway error: {message}")]
    Gateway {
        /// Gateway-provided or transport message
        message: String,
    },

    /// Object storage rejected the upload or was unreachable
    #[error("Storage error: {message}")]
    Storage {
        /// Provider-provided or transport message
        message: String,
    },

    /// Caller identity or admin token missing or wrong
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Human-readable reason
        message: String,
    },

    /// Caller is known but may not act on the resource
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Human-readable reason
        message: String,
    },

    /// Webhook checksum did not match its payload
    #[error("Webhook signature mismatch")]
    SignatureMismatch,

    /// No free order code could be allocated
    #[error("Could not allocate an order code after {attempts} attempts")]
    OrderCodeExhausted {
        /// How many codes were tried
        attempts: u32,
    },

    /// Outbound HTTP transport failure
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O failure (config file, listener)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
