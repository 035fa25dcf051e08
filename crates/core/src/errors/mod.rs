//! Error types and Result alias for the points engine

use crate::models::RedemptionStatus;
use thiserror::Error;

/// Main error type for the points engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid item type: {0}")]
    InvalidItemType(String),

    #[error("Insufficient points: {needed} more needed")]
    InsufficientPoints { needed: u64 },

    #[error("Offer is not active: {0}")]
    OfferInactive(String),

    #[error("Ledger changed during redemption, reload and retry")]
    ConcurrentRedemptionConflict,

    #[error("Ledger changed concurrently: {0}")]
    ConcurrentLedgerUpdate(String),

    #[error("Ledger not found: {0}")]
    LedgerNotFound(String),

    #[error("Ledger already exists: {0}")]
    LedgerExists(String),

    #[error("Offer not found: {0}")]
    OfferNotFound(String),

    #[error("Redemption not found: {0}")]
    RedemptionNotFound(String),

    #[error("Invalid redemption status transition: {from} -> {to}")]
    InvalidStatusTransition {
        from: RedemptionStatus,
        to: RedemptionStatus,
    },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}

impl Error {
    /// Whether the caller should reload the ledger and try again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::ConcurrentRedemptionConflict | Error::ConcurrentLedgerUpdate(_)
        )
    }
}
