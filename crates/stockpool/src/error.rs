//! Error types for the `Stockpool` engine.
//!
//! Every operation returns a structured [`Error`]; turning a kind into a
//! human-readable message is the caller's job.

use stockpool_core::db::DatabaseError;
use thiserror::Error;

/// Result type alias using the engine [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A referenced client, stock item or sale does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation is not permitted in the record's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The sale is missing or no longer pending.
    #[error("Sale {sale_id} is not pending")]
    SaleNotEligible { sale_id: i64 },

    /// The stock item is missing, already assigned, or for another service.
    #[error("Stock item {stock_item_id} cannot be assigned")]
    StockNotEligible { stock_item_id: i64 },

    /// Required input is missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The caller lacks the capability for this operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The store was busy or timed out; nothing was written.
    #[error("Transient storage failure: {0}")]
    Transient(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Flat classification of [`Error`] for boundary layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    SaleNotEligible,
    StockNotEligible,
    Validation,
    Forbidden,
    Transient,
    Storage,
    Config,
}

impl Error {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::SaleNotEligible { .. } => ErrorKind::SaleNotEligible,
            Self::StockNotEligible { .. } => ErrorKind::StockNotEligible,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Transient(_) => ErrorKind::Transient,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Re-running the whole operation is safe and may succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<DatabaseError> for Error {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound(what) => Self::NotFound(what),
            DatabaseError::Busy(msg) => Self::Transient(msg),
            DatabaseError::UniqueViolation(msg) | DatabaseError::Conflict(msg) => {
                Self::InvalidState(msg)
            }
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<stockpool_core::Error> for Error {
    fn from(e: stockpool_core::Error) -> Self {
        Self::Config(e.to_string())
    }
}
