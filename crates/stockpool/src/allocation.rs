//! Allocation Engine: binds one available stock item to one pending sale.
//!
//! The engine never picks a candidate and never retries. A rejected call
//! leaves both records untouched; the caller re-lists eligible stock and
//! tries again with another item.

use std::sync::Arc;
use std::time::Duration;

use stockpool_core::Clock;
use tracing::{info, instrument, warn};

use crate::error::{Error, Result};
use crate::storage::{AssignOutcome, Database, Sale};

#[derive(Debug, Clone)]
pub struct AllocationEngine {
    db: Database,
    clock: Arc<dyn Clock>,
    default_duration: Duration,
}

impl AllocationEngine {
    pub fn new(db: Database, clock: Arc<dyn Clock>, default_duration: Duration) -> Self {
        Self {
            db,
            clock,
            default_duration,
        }
    }

    /// Subscription length used by [`Self::assign_default`].
    pub const fn default_duration(&self) -> Duration {
        self.default_duration
    }

    /// Assign `stock_item_id` to `sale_id` for `duration`, starting now.
    ///
    /// Fails with [`Error::SaleNotEligible`] unless the sale exists and is
    /// pending, then with [`Error::StockNotEligible`] unless the item exists,
    /// is available and serves the sale's service. Of several concurrent
    /// calls for the same item exactly one succeeds.
    #[instrument(skip(self))]
    pub async fn assign(
        &self,
        sale_id: i64,
        stock_item_id: i64,
        duration: Duration,
    ) -> Result<Sale> {
        let start_time = self.clock.now();
        let end_time = i64::try_from(duration.as_secs())
            .ok()
            .and_then(|secs| start_time.checked_add(secs))
            .ok_or_else(|| {
                Error::Validation(format!("subscription duration {duration:?} is too long"))
            })?;

        match self
            .db
            .assign_stock_to_sale(sale_id, stock_item_id, start_time, end_time)
            .await?
        {
            AssignOutcome::Assigned(sale) => {
                info!(sale_id, stock_item_id, start_time, end_time, "Stock assigned to sale");
                Ok(sale)
            }
            AssignOutcome::SaleNotEligible => {
                warn!(sale_id, stock_item_id, "Assignment rejected: sale not pending");
                Err(Error::SaleNotEligible { sale_id })
            }
            AssignOutcome::StockNotEligible => {
                warn!(sale_id, stock_item_id, "Assignment rejected: stock not eligible");
                Err(Error::StockNotEligible { stock_item_id })
            }
        }
    }

    /// [`Self::assign`] with the configured subscription length.
    pub async fn assign_default(&self, sale_id: i64, stock_item_id: i64) -> Result<Sale> {
        self.assign(sale_id, stock_item_id, self.default_duration)
            .await
    }
}
