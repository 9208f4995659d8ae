//! Stock item queries.

use super::db::{Database, DatabaseError};
use super::models::{Sale, StockItem, StockStatus};

/// Parameters for adding a stock item.
#[derive(Debug, Clone, Copy)]
pub struct NewStockItem<'a> {
    pub service: &'a str,
    pub secret: &'a str,
    pub profile: Option<&'a str>,
    pub note: Option<&'a str>,
}

/// Partial update of a stock item's descriptive fields.
///
/// `None` keeps the stored value. For the nullable columns (`profile`,
/// `note`) the inner `Option` distinguishes "set to value" from "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockItemUpdate {
    pub service: Option<String>,
    pub secret: Option<String>,
    pub profile: Option<Option<String>>,
    pub note: Option<Option<String>>,
}

impl StockItemUpdate {
    pub const fn is_empty(&self) -> bool {
        self.service.is_none()
            && self.secret.is_none()
            && self.profile.is_none()
            && self.note.is_none()
    }
}

impl Database {
    /// Add a stock item with status `available`.
    pub async fn create_stock_item(
        &self,
        item: &NewStockItem<'_>,
        now: i64,
    ) -> Result<StockItem, DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO stock_items (service, secret, profile, status, note, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(item.service)
        .bind(item.secret)
        .bind(item.profile)
        .bind(StockStatus::Available.as_str())
        .bind(item.note)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_stock_item(result.last_insert_rowid()).await
    }

    /// Get a stock item by ID.
    pub async fn get_stock_item(&self, id: i64) -> Result<StockItem, DatabaseError> {
        sqlx::query_as::<_, StockItem>("SELECT * FROM stock_items WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("StockItem {id}")))
    }

    /// Available items for one service, oldest first.
    pub async fn list_available_stock(&self, service: &str) -> Result<Vec<StockItem>, DatabaseError> {
        let items = sqlx::query_as::<_, StockItem>(
            "SELECT * FROM stock_items WHERE service = ? AND status = ? ORDER BY id ASC",
        )
        .bind(service)
        .bind(StockStatus::Available.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(items)
    }

    /// Every stock item, grouped by service then status.
    pub async fn list_stock(&self) -> Result<Vec<StockItem>, DatabaseError> {
        let items = sqlx::query_as::<_, StockItem>(
            "SELECT * FROM stock_items ORDER BY service ASC, status ASC, id ASC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(items)
    }

    /// Distinct services that have at least one available item.
    pub async fn list_available_services(&self) -> Result<Vec<String>, DatabaseError> {
        let services: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT service FROM stock_items WHERE status = ? ORDER BY service ASC",
        )
        .bind(StockStatus::Available.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(services.into_iter().map(|(s,)| s).collect())
    }

    /// Apply a partial update inside a single transaction.
    ///
    /// Status is never touched here; only the allocation transaction moves it.
    /// Changing the service of an assigned item is a [`DatabaseError::Conflict`]:
    /// the bound sale must keep naming the same service as its item.
    pub async fn update_stock_item_partial(
        &self,
        id: i64,
        update: &StockItemUpdate,
    ) -> Result<StockItem, DatabaseError> {
        let mut tx = self.pool().begin().await?;

        let existing = sqlx::query_as::<_, StockItem>("SELECT * FROM stock_items WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("StockItem {id}")))?;

        let service = update.service.as_deref().unwrap_or(&existing.service);
        if service != existing.service && !existing.is_available() {
            return Err(DatabaseError::Conflict(format!(
                "StockItem {id} is assigned; its service cannot change"
            )));
        }
        let secret = update.secret.as_deref().unwrap_or(&existing.secret);
        let profile = match &update.profile {
            Some(v) => v.as_deref(),
            None => existing.profile.as_deref(),
        };
        let note = match &update.note {
            Some(v) => v.as_deref(),
            None => existing.note.as_deref(),
        };

        sqlx::query("UPDATE stock_items SET service = ?, secret = ?, profile = ?, note = ? WHERE id = ?")
            .bind(service)
            .bind(secret)
            .bind(profile)
            .bind(note)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let updated = sqlx::query_as::<_, StockItem>("SELECT * FROM stock_items WHERE id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Delete a stock item only if it is still available.
    ///
    /// Returns `false` when nothing was deleted: the item is missing or
    /// assigned. The status check and the delete are one statement.
    pub async fn remove_available_stock_item(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM stock_items WHERE id = ? AND status = ?")
            .bind(id)
            .bind(StockStatus::Available.as_str())
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The sale bound to a stock item, if any.
    pub async fn sale_for_stock_item(
        &self,
        stock_item_id: i64,
    ) -> Result<Option<Sale>, DatabaseError> {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE stock_item_id = ?")
            .bind(stock_item_id)
            .fetch_optional(self.pool())
            .await?;

        Ok(sale)
    }
}
