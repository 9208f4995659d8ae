//! Stock Ledger: inventory of service credentials.

use std::sync::Arc;

use stockpool_core::Clock;
use tracing::{info, instrument, warn};

use super::{optional, required};
use crate::error::{Error, Result};
use crate::storage::{Database, NewStockItem, Sale, StockItem, StockItemUpdate};

#[derive(Debug, Clone)]
pub struct StockLedger {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl StockLedger {
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Add a credential to inventory as `available`.
    #[instrument(skip(self, secret))]
    pub async fn add_item(
        &self,
        service: &str,
        secret: &str,
        profile: Option<&str>,
        note: Option<&str>,
    ) -> Result<StockItem> {
        let item = NewStockItem {
            service: required("service", service)?,
            secret: required("secret", secret)?,
            profile: optional(profile),
            note: optional(note),
        };

        let created = self.db.create_stock_item(&item, self.clock.now()).await?;
        info!(stock_item_id = created.id, service = %created.service, "Stock item added");
        Ok(created)
    }

    /// Available items for `service`, in id order.
    pub async fn list_available(&self, service: &str) -> Result<Vec<StockItem>> {
        Ok(self.db.list_available_stock(service.trim()).await?)
    }

    /// Change descriptive fields. Status and the sale binding are untouched.
    #[instrument(skip(self, update))]
    pub async fn update_fields(&self, id: i64, update: StockItemUpdate) -> Result<StockItem> {
        let update = normalize_update(update)?;
        let item = self.db.update_stock_item_partial(id, &update).await?;
        info!(stock_item_id = id, "Stock item updated");
        Ok(item)
    }

    /// Delete an available item. Assigned items are protected: removing one
    /// would orphan an active subscription.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: i64) -> Result<()> {
        if self.db.remove_available_stock_item(id).await? {
            info!(stock_item_id = id, "Stock item removed");
            return Ok(());
        }

        // Nothing deleted: either missing (NotFound propagates) or assigned.
        let item = self.db.get_stock_item(id).await?;
        warn!(stock_item_id = id, status = %item.status, "Refusing to remove stock item");
        Err(Error::InvalidState(format!(
            "stock item {id} is {} and cannot be removed",
            item.status
        )))
    }

    pub async fn get(&self, id: i64) -> Result<StockItem> {
        Ok(self.db.get_stock_item(id).await?)
    }

    /// Every item, grouped by service then status.
    pub async fn list_all(&self) -> Result<Vec<StockItem>> {
        Ok(self.db.list_stock().await?)
    }

    /// Services that can currently be fulfilled.
    pub async fn catalog(&self) -> Result<Vec<String>> {
        Ok(self.db.list_available_services().await?)
    }

    /// The sale holding `id`, if it is assigned.
    pub async fn sale_for_item(&self, id: i64) -> Result<Option<Sale>> {
        Ok(self.db.sale_for_stock_item(id).await?)
    }
}

/// Trim supplied values; blank service/secret are rejected, blank
/// profile/note clear the column.
fn normalize_update(update: StockItemUpdate) -> Result<StockItemUpdate> {
    let service = update
        .service
        .map(|s| required("service", &s).map(str::to_string))
        .transpose()?;
    let secret = update
        .secret
        .map(|s| required("secret", &s).map(str::to_string))
        .transpose()?;
    let profile = update
        .profile
        .map(|p| optional(p.as_deref()).map(str::to_string));
    let note = update.note.map(|n| optional(n.as_deref()).map(str::to_string));

    Ok(StockItemUpdate {
        service,
        secret,
        profile,
        note,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use stockpool_core::ManualClock;

    use super::*;
    use crate::error::ErrorKind;
    use crate::storage::StockStatus;

    async fn ledger() -> StockLedger {
        let db = Database::open_in_memory().await.unwrap();
        StockLedger::new(db, Arc::new(ManualClock::new(1_000)))
    }

    #[tokio::test]
    async fn add_item_requires_service_and_secret() {
        let stock = ledger().await;
        assert_eq!(
            stock.add_item("", "pw", None, None).await.unwrap_err().kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            stock
                .add_item("Netflix", "  ", None, None)
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::Validation
        );

        let item = stock
            .add_item(" Netflix ", "pw", Some(" "), Some("card ends 4242"))
            .await
            .unwrap();
        assert_eq!(item.service, "Netflix");
        assert_eq!(item.status, StockStatus::Available);
        assert!(item.profile.is_none());
        assert_eq!(item.note.as_deref(), Some("card ends 4242"));
    }

    #[tokio::test]
    async fn update_rejects_blank_secret_and_clears_blank_note() {
        let stock = ledger().await;
        let item = stock
            .add_item("Netflix", "pw", Some("Perfil 2"), Some("old"))
            .await
            .unwrap();

        let err = stock
            .update_fields(
                item.id,
                StockItemUpdate {
                    secret: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let updated = stock
            .update_fields(
                item.id,
                StockItemUpdate {
                    note: Some(Some("  ".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.note.is_none());
        assert_eq!(updated.profile.as_deref(), Some("Perfil 2"));
        assert_eq!(updated.status, StockStatus::Available);
    }

    #[tokio::test]
    async fn update_missing_item_is_not_found() {
        let stock = ledger().await;
        let err = stock
            .update_fields(7, StockItemUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn remove_available_item() {
        let stock = ledger().await;
        let item = stock.add_item("Netflix", "pw", None, None).await.unwrap();
        stock.remove(item.id).await.unwrap();

        assert!(stock.list_available("Netflix").await.unwrap().is_empty());
        assert_eq!(
            stock.remove(item.id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
