//! Error types for `Stockpool` core library.

use thiserror::Error;

/// Result type alias using `Stockpool` core Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `Stockpool` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
