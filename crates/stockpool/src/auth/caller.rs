//! Explicit caller identity passed into every boundary operation.
//!
//! Capabilities can only be minted by a successful login: [`AdminGate`] for
//! the admin, [`crate::Stockpool::login_client`] for clients.

use tracing::{info, warn};

use super::password::verify_password;
use crate::error::{Error, Result};

/// Proof that the admin password was verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCapability(());

/// Proof that a client identified themselves by phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSession {
    client_id: i64,
}

impl ClientSession {
    pub(crate) const fn new(client_id: i64) -> Self {
        Self { client_id }
    }

    pub const fn client_id(&self) -> i64 {
        self.client_id
    }
}

/// Who is invoking an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Admin(AdminCapability),
    Client(ClientSession),
    Anonymous,
}

impl Caller {
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin(_))
    }

    pub const fn client_id(&self) -> Option<i64> {
        match self {
            Self::Client(session) => Some(session.client_id),
            Self::Admin(_) | Self::Anonymous => None,
        }
    }

    pub(crate) fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::Forbidden("admin capability required".to_string()))
        }
    }

    /// The caller must be logged in as a client; returns its id.
    pub(crate) fn require_client(&self) -> Result<i64> {
        self.client_id()
            .ok_or_else(|| Error::Forbidden("client login required".to_string()))
    }

    /// The admin, or the client owning `client_id`.
    pub(crate) fn require_admin_or_client(&self, client_id: i64) -> Result<()> {
        match self {
            Self::Admin(_) => Ok(()),
            Self::Client(session) if session.client_id == client_id => Ok(()),
            _ => Err(Error::Forbidden(format!(
                "not allowed to act for client {client_id}"
            ))),
        }
    }
}

/// Verifies the admin password against the configured argon2 hash.
#[derive(Debug, Clone)]
pub struct AdminGate {
    password_hash: Option<String>,
}

impl AdminGate {
    pub const fn new(password_hash: Option<String>) -> Self {
        Self { password_hash }
    }

    pub fn login(&self, password: &str) -> Result<Caller> {
        let hash = self
            .password_hash
            .as_deref()
            .ok_or_else(|| Error::Config("admin password hash is not configured".to_string()))?;

        let valid = verify_password(password, hash)
            .map_err(|e| Error::Config(format!("invalid admin password hash: {e}")))?;
        if !valid {
            warn!("Admin login rejected");
            return Err(Error::Forbidden("wrong admin password".to_string()));
        }

        info!("Admin logged in");
        Ok(Caller::Admin(AdminCapability(())))
    }
}
