//! Error taxonomy of the badge engine

use crate::domain::CategoryId;

/// Errors raised by the badge engine
///
/// All variants are recoverable. Storage failures are absorbed by
/// [`BadgeEngine`](super::BadgeEngine) and surfaced as a one-time warning
/// instead of being returned from the mutating calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BadgeError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },

    #[error("Unknown category: {0}")]
    UnknownCategory(CategoryId),

    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl BadgeError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Wrap a store error, keeping the whole context chain in the message
    pub(crate) fn storage(err: &anyhow::Error) -> Self {
        Self::StorageFailure(format!("{:#}", err))
    }
}
