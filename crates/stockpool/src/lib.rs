//! Stockpool
//!
//! Allocates a finite pool of shared-account credentials ("stock") to client
//! purchases, exclusively and durably, and tracks each subscription's active
//! window until it expires.

pub mod allocation;
pub mod auth;
pub mod cli;
pub mod error;
pub mod expiry;
pub mod ledger;
pub mod notifications;
pub mod service;
pub mod storage;

pub use auth::{AdminGate, Caller};
pub use error::{Error, ErrorKind, Result};
pub use service::Stockpool;
