//! Caller capabilities and admin password handling.

pub mod caller;
pub mod password;

pub use caller::{AdminCapability, AdminGate, Caller, ClientSession};
