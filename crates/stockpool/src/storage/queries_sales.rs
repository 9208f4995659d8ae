//! Sale queries, including the allocation transaction.

use super::db::{Database, DatabaseError};
use super::models::{Sale, SaleStatus};

/// Parameters for recording a purchase request.
#[derive(Debug, Clone, Copy)]
pub struct NewSale<'a> {
    pub client_id: i64,
    pub service: &'a str,
    pub payment_reference: Option<&'a str>,
}

/// Result of the allocation transaction. Only `Assigned` committed anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    Assigned(Sale),
    /// The sale is missing or no longer pending.
    SaleNotEligible,
    /// The stock item is missing, already assigned, or for another service.
    StockNotEligible,
}

/// Compare-and-set on the stock item. Matches only while the item is
/// available and the sale is a pending request for the same service.
const CLAIM_STOCK_SQL: &str = r"
    UPDATE stock_items SET status = 'assigned'
    WHERE id = ?
      AND status = 'available'
      AND service = (SELECT service FROM sales WHERE id = ? AND status = 'pending')
";

const BIND_SALE_SQL: &str = r"
    UPDATE sales
    SET stock_item_id = ?, status = 'assigned', start_time = ?, end_time = ?
    WHERE id = ? AND status = 'pending'
";

impl Database {
    /// Record a new pending sale.
    pub async fn create_sale(&self, sale: &NewSale<'_>, now: i64) -> Result<Sale, DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO sales (client_id, service, payment_reference, status, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(sale.client_id)
        .bind(sale.service)
        .bind(sale.payment_reference)
        .bind(SaleStatus::Pending.as_str())
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_sale(result.last_insert_rowid()).await
    }

    /// Get a sale by ID.
    pub async fn get_sale(&self, id: i64) -> Result<Sale, DatabaseError> {
        sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Sale {id}")))
    }

    /// Pending sales, oldest request first.
    pub async fn list_pending_sales(&self) -> Result<Vec<Sale>, DatabaseError> {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales WHERE status = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(SaleStatus::Pending.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(sales)
    }

    /// Assigned sales whose window ends at or before `cutoff`, soonest first.
    pub async fn list_sales_expiring_by(&self, cutoff: i64) -> Result<Vec<Sale>, DatabaseError> {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales WHERE status = ? AND end_time IS NOT NULL AND end_time <= ? ORDER BY end_time ASC, id ASC",
        )
        .bind(SaleStatus::Assigned.as_str())
        .bind(cutoff)
        .fetch_all(self.pool())
        .await?;

        Ok(sales)
    }

    /// A client's sales that have a bound stock item, latest end first and
    /// open-ended windows last.
    pub async fn list_bound_sales_for_client(
        &self,
        client_id: i64,
    ) -> Result<Vec<Sale>, DatabaseError> {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales WHERE client_id = ? AND stock_item_id IS NOT NULL ORDER BY end_time IS NULL ASC, end_time DESC, id DESC",
        )
        .bind(client_id)
        .fetch_all(self.pool())
        .await?;

        Ok(sales)
    }

    /// Bind an available stock item to a pending sale, atomically.
    ///
    /// The first statement is the stock compare-and-set. Being a write, it
    /// takes `SQLite`'s write lock before reading anything, so concurrent
    /// calls are serialized and a loser sees the winner's committed state.
    /// A rejected claim is diagnosed inside the same transaction and then
    /// rolled back; nothing is written unless both rows change.
    pub async fn assign_stock_to_sale(
        &self,
        sale_id: i64,
        stock_item_id: i64,
        start_time: i64,
        end_time: i64,
    ) -> Result<AssignOutcome, DatabaseError> {
        let mut tx = self.pool().begin().await?;

        let claimed = sqlx::query(CLAIM_STOCK_SQL)
            .bind(stock_item_id)
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        if claimed.rows_affected() == 0 {
            let sale_status: Option<String> =
                sqlx::query_scalar("SELECT status FROM sales WHERE id = ?")
                    .bind(sale_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;

            return Ok(match sale_status.as_deref() {
                Some(status) if status == SaleStatus::Pending.as_str() => {
                    AssignOutcome::StockNotEligible
                }
                _ => AssignOutcome::SaleNotEligible,
            });
        }

        let bound = sqlx::query(BIND_SALE_SQL)
            .bind(stock_item_id)
            .bind(start_time)
            .bind(end_time)
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        if bound.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(AssignOutcome::SaleNotEligible);
        }

        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?")
            .bind(sale_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(AssignOutcome::Assigned(sale))
    }
}
