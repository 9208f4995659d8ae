//! `Stockpool` service: the boundary every front end goes through.
//!
//! Each operation takes an explicit [`Caller`] and checks its capability
//! before touching a ledger. Admin-only: inventory management, the pending
//! queue, assignment and expiration reports. Clients: placing orders and
//! reading their own subscriptions.

use std::sync::Arc;
use std::time::Duration;

use stockpool_core::config::default_database_path;
use stockpool_core::{Clock, Config, SystemClock};
use tokio_util::task::TaskTracker;
use tracing::{info, instrument};

use crate::allocation::AllocationEngine;
use crate::auth::{AdminGate, Caller, ClientSession};
use crate::error::{Error, Result};
use crate::expiry::ExpirationReporter;
use crate::ledger::{ClientLedger, SaleLedger, StockLedger};
use crate::notifications::{self, LogNotifier, NewOrder, OrderNotifier};
use crate::storage::{Client, Database, Sale, StockItem, StockItemUpdate};

#[derive(Debug, Clone)]
pub struct Stockpool {
    clients: ClientLedger,
    stock: StockLedger,
    sales: SaleLedger,
    engine: AllocationEngine,
    expiry: ExpirationReporter,
    admin_gate: AdminGate,
    notifier: Arc<dyn OrderNotifier>,
    notifications: TaskTracker,
}

impl Stockpool {
    pub fn new(
        db: Database,
        clock: Arc<dyn Clock>,
        config: &Config,
        notifier: Arc<dyn OrderNotifier>,
    ) -> Self {
        let sales = SaleLedger::new(db.clone(), Arc::clone(&clock));
        Self {
            clients: ClientLedger::new(db.clone(), Arc::clone(&clock)),
            stock: StockLedger::new(db.clone(), Arc::clone(&clock)),
            engine: AllocationEngine::new(
                db,
                Arc::clone(&clock),
                config.subscription.default_duration(),
            ),
            expiry: ExpirationReporter::new(
                sales.clone(),
                clock,
                config.subscription.expiring_window(),
            ),
            sales,
            admin_gate: AdminGate::new(config.admin.password_hash.clone()),
            notifier,
            notifications: TaskTracker::new(),
        }
    }

    /// Open the configured database with the wall clock and the configured
    /// notifier.
    pub async fn open(config: &Config) -> Result<Self> {
        let path = config
            .storage
            .database_path
            .clone()
            .or_else(default_database_path)
            .ok_or_else(|| Error::Config("cannot determine database path".to_string()))?;

        info!(path = %path.display(), "Opening stockpool database");
        let db = Database::open(&path).await?;

        Ok(Self::new(db, Arc::new(SystemClock), config, notifier_for(config)?))
    }

    /// Wait for in-flight order notifications, giving up after `timeout`.
    ///
    /// Returns `false` if some were still running. Call before the runtime
    /// shuts down; dropped tasks never reach the notifier.
    pub async fn flush_notifications(&self, timeout: Duration) -> bool {
        self.notifications.close();
        let finished = tokio::time::timeout(timeout, self.notifications.wait())
            .await
            .is_ok();
        self.notifications.reopen();

        if !finished {
            tracing::warn!(
                pending = self.notifications.len(),
                "Gave up waiting for order notifications"
            );
        }
        finished
    }

    // =========================================================================
    // Identity
    // =========================================================================

    pub fn login_admin(&self, password: &str) -> Result<Caller> {
        self.admin_gate.login(password)
    }

    /// Identify a client by phone, registering it on first contact.
    pub async fn login_client(&self, phone: &str, name: Option<&str>) -> Result<Caller> {
        let client = self.clients.login(phone, name).await?;
        Ok(Caller::Client(ClientSession::new(client.id)))
    }

    pub async fn get_client(&self, caller: &Caller, client_id: i64) -> Result<Client> {
        caller.require_admin_or_client(client_id)?;
        self.clients.get(client_id).await
    }

    pub async fn rename_client(&self, caller: &Caller, client_id: i64, name: &str) -> Result<Client> {
        caller.require_admin_or_client(client_id)?;
        self.clients.rename(client_id, name).await
    }

    // =========================================================================
    // Purchase flow
    // =========================================================================

    /// Services with stock on hand. Open to everyone.
    pub async fn catalog(&self) -> Result<Vec<String>> {
        self.stock.catalog().await
    }

    /// Place an order for `service`. The admin is notified in the
    /// background; delivery problems never fail the order.
    #[instrument(skip(self, caller, payment_reference))]
    pub async fn create_sale(
        &self,
        caller: &Caller,
        service: &str,
        payment_reference: Option<&str>,
    ) -> Result<Sale> {
        let client_id = caller.require_client()?;
        let client = self.clients.get(client_id).await?;
        let sale = self
            .sales
            .create_sale(client_id, service, payment_reference)
            .await?;

        notifications::dispatch(
            &self.notifications,
            Arc::clone(&self.notifier),
            NewOrder {
                sale_id: sale.id,
                service: sale.service.clone(),
                client_id,
                client_phone: client.phone,
                client_name: client.name,
                payment_reference: sale.payment_reference.clone(),
                created_at: sale.created_at,
            },
        );

        Ok(sale)
    }

    /// Sales holding a stock item for `client_id`, latest end first.
    pub async fn list_active_for_client(&self, caller: &Caller, client_id: i64) -> Result<Vec<Sale>> {
        caller.require_admin_or_client(client_id)?;
        self.sales.list_active_for_client(client_id).await
    }

    pub async fn get_sale(&self, caller: &Caller, sale_id: i64) -> Result<Sale> {
        let sale = self.sales.get(sale_id).await?;
        caller.require_admin_or_client(sale.client_id)?;
        Ok(sale)
    }

    // =========================================================================
    // Admin fulfillment
    // =========================================================================

    pub async fn list_pending(&self, caller: &Caller) -> Result<Vec<Sale>> {
        caller.require_admin()?;
        self.sales.list_pending().await
    }

    /// Assign stock to a sale. `duration` defaults to the configured
    /// subscription length.
    pub async fn assign(
        &self,
        caller: &Caller,
        sale_id: i64,
        stock_item_id: i64,
        duration: Option<Duration>,
    ) -> Result<Sale> {
        caller.require_admin()?;
        let duration = duration.unwrap_or_else(|| self.engine.default_duration());
        self.engine.assign(sale_id, stock_item_id, duration).await
    }

    pub async fn report_expiring_soon(&self, caller: &Caller) -> Result<Vec<Sale>> {
        caller.require_admin()?;
        self.expiry.report_expiring_soon().await
    }

    pub async fn report_expiring_within(&self, caller: &Caller, window: Duration) -> Result<Vec<Sale>> {
        caller.require_admin()?;
        self.expiry.report_expiring_within(window).await
    }

    // =========================================================================
    // Admin inventory
    // =========================================================================

    pub async fn list_available(&self, caller: &Caller, service: &str) -> Result<Vec<StockItem>> {
        caller.require_admin()?;
        self.stock.list_available(service).await
    }

    pub async fn list_stock(&self, caller: &Caller) -> Result<Vec<StockItem>> {
        caller.require_admin()?;
        self.stock.list_all().await
    }

    pub async fn get_stock_item(&self, caller: &Caller, id: i64) -> Result<StockItem> {
        caller.require_admin()?;
        self.stock.get(id).await
    }

    pub async fn add_stock(
        &self,
        caller: &Caller,
        service: &str,
        secret: &str,
        profile: Option<&str>,
        note: Option<&str>,
    ) -> Result<StockItem> {
        caller.require_admin()?;
        self.stock.add_item(service, secret, profile, note).await
    }

    pub async fn update_stock(
        &self,
        caller: &Caller,
        id: i64,
        update: StockItemUpdate,
    ) -> Result<StockItem> {
        caller.require_admin()?;
        self.stock.update_fields(id, update).await
    }

    pub async fn remove_stock(&self, caller: &Caller, id: i64) -> Result<()> {
        caller.require_admin()?;
        self.stock.remove(id).await
    }

    /// The sale holding a stock item, if any.
    pub async fn sale_for_stock_item(&self, caller: &Caller, id: i64) -> Result<Option<Sale>> {
        caller.require_admin()?;
        self.stock.sale_for_item(id).await
    }
}

/// Pick the notifier the configuration asks for.
fn notifier_for(config: &Config) -> Result<Arc<dyn OrderNotifier>> {
    match config.notifications.webhook_url.as_deref() {
        #[cfg(feature = "webhook-notifications")]
        Some(url) => {
            let notifier = notifications::WebhookNotifier::new(url)
                .map_err(|e| Error::Config(e.to_string()))?;
            info!(url = %notifier.url(), "Forwarding new orders to webhook");
            Ok(Arc::new(notifier))
        }
        #[cfg(not(feature = "webhook-notifications"))]
        Some(_) => {
            tracing::warn!("webhook_url is set but this build lacks webhook-notifications; logging orders instead");
            Ok(Arc::new(LogNotifier))
        }
        None => Ok(Arc::new(LogNotifier)),
    }
}
