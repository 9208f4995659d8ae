//! Expiration Reporter: sales whose active window is about to close.
//!
//! Pure read over the Sale Ledger; nothing is cached and nothing is
//! deactivated. Expired stock stays assigned until an admin deals with it.

use std::sync::Arc;
use std::time::Duration;

use stockpool_core::Clock;
use tracing::debug;

use crate::error::Result;
use crate::ledger::SaleLedger;
use crate::storage::Sale;

#[derive(Debug, Clone)]
pub struct ExpirationReporter {
    sales: SaleLedger,
    clock: Arc<dyn Clock>,
    soon_window: Duration,
}

impl ExpirationReporter {
    pub fn new(sales: SaleLedger, clock: Arc<dyn Clock>, soon_window: Duration) -> Self {
        Self {
            sales,
            clock,
            soon_window,
        }
    }

    /// Assigned sales ending at or before `now + window`, including those
    /// already expired, soonest first.
    pub async fn report_expiring_within(&self, window: Duration) -> Result<Vec<Sale>> {
        let now = self.clock.now();
        let window_secs = i64::try_from(window.as_secs()).unwrap_or(i64::MAX);
        let cutoff = now.saturating_add(window_secs);

        let sales = self.sales.list_expiring_by(cutoff).await?;
        debug!(now, cutoff, count = sales.len(), "Expiration report");
        Ok(sales)
    }

    /// [`Self::report_expiring_within`] using the configured window.
    pub async fn report_expiring_soon(&self) -> Result<Vec<Sale>> {
        self.report_expiring_within(self.soon_window).await
    }
}
