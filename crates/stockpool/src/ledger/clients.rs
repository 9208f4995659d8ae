//! Client Ledger.

use std::sync::Arc;

use stockpool_core::Clock;
use stockpool_core::db::DatabaseError;
use tracing::{debug, info, instrument};

use super::required;
use crate::error::{Error, Result};
use crate::storage::{Client, Database};

#[derive(Debug, Clone)]
pub struct ClientLedger {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl ClientLedger {
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Create a client identified by `phone`.
    #[instrument(skip(self))]
    pub async fn register(&self, phone: &str, name: &str) -> Result<Client> {
        let phone = required("phone", phone)?;
        let name = required("name", name)?;

        let client = self
            .db
            .create_client(phone, name, self.clock.now())
            .await
            .map_err(|e| match e {
                DatabaseError::UniqueViolation(_) => {
                    Error::InvalidState(format!("phone {phone} is already registered"))
                }
                other => other.into(),
            })?;

        info!(client_id = client.id, "Client registered");
        Ok(client)
    }

    /// Find the client for `phone`, creating it on first contact.
    ///
    /// A name is only needed when the phone is unknown.
    pub async fn login(&self, phone: &str, name: Option<&str>) -> Result<Client> {
        let phone = required("phone", phone)?;
        if let Some(client) = self.find_by_phone(phone).await? {
            debug!(client_id = client.id, "Existing client logged in");
            return Ok(client);
        }
        match name {
            Some(name) => self.register(phone, name).await,
            None => Err(Error::Validation(
                "name is required to register a new client".to_string(),
            )),
        }
    }

    pub async fn get(&self, id: i64) -> Result<Client> {
        Ok(self.db.get_client(id).await?)
    }

    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<Client>> {
        Ok(self.db.get_client_by_phone(phone.trim()).await?)
    }

    /// Name correction; the phone never changes.
    #[instrument(skip(self))]
    pub async fn rename(&self, id: i64, name: &str) -> Result<Client> {
        let name = required("name", name)?;
        let client = self.db.update_client_name(id, name).await?;
        info!(client_id = id, "Client renamed");
        Ok(client)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use stockpool_core::ManualClock;

    use super::*;
    use crate::error::ErrorKind;

    async fn ledger() -> ClientLedger {
        let db = Database::open_in_memory().await.unwrap();
        ClientLedger::new(db, Arc::new(ManualClock::new(1_000)))
    }

    #[tokio::test]
    async fn register_trims_and_stamps() {
        let clients = ledger().await;
        let client = clients.register(" 987654321 ", " Ana ").await.unwrap();
        assert_eq!(client.phone, "987654321");
        assert_eq!(client.name, "Ana");
        assert_eq!(client.created_at, 1_000);
    }

    #[tokio::test]
    async fn duplicate_phone_is_invalid_state() {
        let clients = ledger().await;
        clients.register("987654321", "Ana").await.unwrap();
        let err = clients.register("987654321", "Otra").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn login_creates_then_reuses() {
        let clients = ledger().await;
        let err = clients.login("987654321", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let created = clients.login("987654321", Some("Ana")).await.unwrap();
        let again = clients.login("987654321", None).await.unwrap();
        assert_eq!(created, again);
    }

    #[tokio::test]
    async fn rename_validates_name() {
        let clients = ledger().await;
        let client = clients.register("987654321", "Ana").await.unwrap();
        assert_eq!(
            clients.rename(client.id, " ").await.unwrap_err().kind(),
            ErrorKind::Validation
        );
        assert_eq!(clients.rename(client.id, "Ana María").await.unwrap().name, "Ana María");
        assert_eq!(
            clients.rename(404, "x").await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
