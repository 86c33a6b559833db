//! Moderation decisions.
//!
//! Campaigns, posts and organization requests share one life cycle:
//! `pending -> approved` or `pending -> rejected`, both terminal. Every
//! transition is a conditional update (`WHERE status = 'pending'`), so two
//! admins deciding the same record concurrently cannot both succeed.

use crate::entities::ModerationStatus;
use crate::errors::Error;
use serde::Deserialize;

/// Admin verdict on a pending record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    /// Status the record moves to.
    #[must_use]
    pub const fn status(self) -> ModerationStatus {
        match self {
            Self::Approved => ModerationStatus::Approved,
            Self::Rejected => ModerationStatus::Rejected,
        }
    }

    /// Whether this is an approval.
    #[must_use]
    pub const fn is_approval(self) -> bool {
        matches!(self, Self::Approved)
    }
}

/// Error for a conditional update that moved no row.
///
/// `current` is the status found on re-read, `None` when the record is gone.
pub(crate) fn transition_error(
    entity: &'static str,
    id: &str,
    current: Option<ModerationStatus>,
) -> Error {
    match current {
        Some(status) => Error::InvalidTransition {
            entity,
            id: id.to_string(),
            status: status.as_str().to_string(),
        },
        None => Error::NotFound {
            entity,
            id: id.to_string(),
        },
    }
}
