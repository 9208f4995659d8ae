//! Ledgers: validated access to clients, stock items and sales.
//!
//! Each ledger wraps the shared [`Database`](crate::storage::Database) handle
//! and the clock. They are cheap to clone and safe to share across tasks.

mod clients;
mod sales;
mod stock;

pub use clients::ClientLedger;
pub use sales::SaleLedger;
pub use stock::StockLedger;

use crate::error::{Error, Result};

/// Trim `value` and reject it when nothing is left.
fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

/// Trim `value`, mapping blank input to "unset".
fn optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
