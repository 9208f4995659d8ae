//! Sale Ledger: purchase requests and their fulfillment state.

use std::sync::Arc;

use stockpool_core::Clock;
use tracing::{info, instrument};

use super::{optional, required};
use crate::error::Result;
use crate::storage::{Database, NewSale, Sale};

#[derive(Debug, Clone)]
pub struct SaleLedger {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl SaleLedger {
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Record a pending purchase request.
    ///
    /// The service is not checked against stock: a sale may wait with no
    /// matching inventory.
    #[instrument(skip(self, payment_reference))]
    pub async fn create_sale(
        &self,
        client_id: i64,
        service: &str,
        payment_reference: Option<&str>,
    ) -> Result<Sale> {
        let service = required("service", service)?;
        // Unknown client -> NotFound rather than a foreign-key failure.
        self.db.get_client(client_id).await?;

        let sale = self
            .db
            .create_sale(
                &NewSale {
                    client_id,
                    service,
                    payment_reference: optional(payment_reference),
                },
                self.clock.now(),
            )
            .await?;

        info!(sale_id = sale.id, client_id, service = %sale.service, "Sale created");
        Ok(sale)
    }

    pub async fn get(&self, id: i64) -> Result<Sale> {
        Ok(self.db.get_sale(id).await?)
    }

    /// Pending sales, oldest request first.
    pub async fn list_pending(&self) -> Result<Vec<Sale>> {
        Ok(self.db.list_pending_sales().await?)
    }

    /// Assigned sales with `end_time <= cutoff`, soonest first.
    pub async fn list_expiring_by(&self, cutoff: i64) -> Result<Vec<Sale>> {
        Ok(self.db.list_sales_expiring_by(cutoff).await?)
    }

    /// The client's sales that hold a stock item, latest end first.
    pub async fn list_active_for_client(&self, client_id: i64) -> Result<Vec<Sale>> {
        Ok(self.db.list_bound_sales_for_client(client_id).await?)
    }
}
