//! `Stockpool` Core Library
//!
//! Shared functionality for `Stockpool` components:
//! - Clock abstraction used for every stored timestamp
//! - Configuration resolution and hierarchy
//! - `SQLite` pool helpers and the database error type
//! - Tracing subscriber setup

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod tracing_init;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
