#![allow(clippy::unwrap_used)] // Integration tests use unwrap for brevity

//! End-to-end flow through the `Stockpool` service: order, fulfillment,
//! subscription listing and expiration reporting.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use stockpool::auth::password::hash_password;
use stockpool::notifications::{NewOrder, NotificationError, OrderNotifier};
use stockpool::storage::{Database, SaleStatus, StockItemUpdate};
use stockpool::{Caller, ErrorKind, Stockpool};
use stockpool_core::{Clock, Config, ManualClock};

const T0: i64 = 1_750_000_000;
const DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Default)]
struct Inbox {
    orders: Mutex<Vec<NewOrder>>,
}

#[async_trait]
impl OrderNotifier for Inbox {
    async fn notify_new_order(&self, order: &NewOrder) -> Result<(), NotificationError> {
        self.orders.lock().unwrap().push(order.clone());
        Ok(())
    }
}

fn config() -> Config {
    let mut config = Config::default();
    config.admin.password_hash = Some(hash_password("admin123").unwrap());
    config
}

async fn service(clock: Arc<ManualClock>, inbox: Arc<Inbox>) -> Stockpool {
    let db = Database::open_in_memory().await.unwrap();
    Stockpool::new(db, clock, &config(), inbox)
}

#[tokio::test]
async fn order_to_expiry_flow() {
    let clock = Arc::new(ManualClock::new(T0));
    let inbox = Arc::new(Inbox::default());
    let pool = service(Arc::clone(&clock), Arc::clone(&inbox)).await;
    let admin = pool.login_admin("admin123").unwrap();

    pool.add_stock(&admin, "Netflix", "pw-1", Some("Perfil 1"), None)
        .await
        .unwrap();
    pool.add_stock(&admin, "Netflix", "pw-2", Some("Perfil 2"), None)
        .await
        .unwrap();
    assert_eq!(pool.catalog().await.unwrap(), ["Netflix"]);

    // Client places an order.
    let ana = pool.login_client("987654321", Some("Ana")).await.unwrap();
    clock.advance(60);
    let sale = pool
        .create_sale(&ana, "Netflix", Some("OP-123"))
        .await
        .unwrap();
    assert_eq!(sale.status, SaleStatus::Pending);

    // Admin picks the oldest available item.
    let pending = pool.list_pending(&admin).await.unwrap();
    assert_eq!(pending.len(), 1);
    let candidates = pool.list_available(&admin, "Netflix").await.unwrap();
    assert_eq!(candidates[0].secret, "pw-1");

    let assigned = pool
        .assign(&admin, sale.id, candidates[0].id, None)
        .await
        .unwrap();
    assert_eq!(assigned.start_time, Some(T0 + 60));
    assert_eq!(assigned.end_time, Some(T0 + 60 + 30 * DAY));
    assert!(pool.list_pending(&admin).await.unwrap().is_empty());
    assert_eq!(pool.list_available(&admin, "Netflix").await.unwrap().len(), 1);

    // The client sees the subscription.
    let ana_id = ana.client_id().unwrap();
    let mine = pool.list_active_for_client(&ana, ana_id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert!(mine[0].is_active(clock.now()));

    // Nothing expiring yet; 28 days later it is inside the 3-day window.
    assert!(pool.report_expiring_soon(&admin).await.unwrap().is_empty());
    clock.advance(28 * DAY);
    let soon = pool.report_expiring_soon(&admin).await.unwrap();
    assert_eq!(soon.len(), 1);
    assert_eq!(soon[0].id, sale.id);

    // Past the end it is expired but still reported.
    clock.advance(5 * DAY);
    let soon = pool.report_expiring_soon(&admin).await.unwrap();
    assert_eq!(soon.len(), 1);
    assert!(soon[0].is_expired(clock.now()));

    // The admin saw the new order.
    assert!(pool.flush_notifications(Duration::from_secs(5)).await);
    let orders = inbox.orders.lock().unwrap().clone();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].client_name, "Ana");
    assert_eq!(orders[0].service, "Netflix");
}

#[tokio::test]
async fn capability_checks_at_the_boundary() {
    let clock = Arc::new(ManualClock::new(T0));
    let pool = service(clock, Arc::new(Inbox::default())).await;
    let admin = pool.login_admin("admin123").unwrap();
    let ana = pool.login_client("1", Some("Ana")).await.unwrap();
    let luis = pool.login_client("2", Some("Luis")).await.unwrap();

    let item = pool
        .add_stock(&admin, "Netflix", "pw", None, None)
        .await
        .unwrap();
    let sale = pool.create_sale(&ana, "Netflix", None).await.unwrap();

    let forbidden = [
        pool.assign(&ana, sale.id, item.id, None).await.unwrap_err(),
        pool.remove_stock(&ana, item.id).await.unwrap_err(),
        pool.update_stock(&ana, item.id, StockItemUpdate::default())
            .await
            .unwrap_err(),
        pool.list_stock(&luis).await.unwrap_err(),
        pool.list_active_for_client(&luis, ana.client_id().unwrap())
            .await
            .unwrap_err(),
        pool.create_sale(&admin, "Netflix", None).await.unwrap_err(),
        pool.list_pending(&Caller::Anonymous).await.unwrap_err(),
    ];
    for err in forbidden {
        assert_eq!(err.kind(), ErrorKind::Forbidden, "{err}");
    }

    assert_eq!(
        pool.login_admin("wrong").unwrap_err().kind(),
        ErrorKind::Forbidden
    );

    // Nothing changed.
    assert_eq!(pool.list_pending(&admin).await.unwrap().len(), 1);
    assert!(pool.get_stock_item(&admin, item.id).await.unwrap().is_available());
}

#[tokio::test]
async fn assigned_stock_is_protected() {
    let clock = Arc::new(ManualClock::new(T0));
    let pool = service(clock, Arc::new(Inbox::default())).await;
    let admin = pool.login_admin("admin123").unwrap();
    let ana = pool.login_client("1", Some("Ana")).await.unwrap();

    let item = pool
        .add_stock(&admin, "Netflix", "pw", None, None)
        .await
        .unwrap();
    let sale = pool.create_sale(&ana, "Netflix", None).await.unwrap();
    pool.assign(&admin, sale.id, item.id, Some(Duration::from_secs(7 * 86_400)))
        .await
        .unwrap();

    assert_eq!(
        pool.remove_stock(&admin, item.id).await.unwrap_err().kind(),
        ErrorKind::InvalidState
    );

    // Descriptive edits never release the item.
    let edited = pool
        .update_stock(
            &admin,
            item.id,
            StockItemUpdate {
                secret: Some("pw-rotated".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.secret, "pw-rotated");
    assert!(!edited.is_available());

    let moved = pool
        .update_stock(
            &admin,
            item.id,
            StockItemUpdate {
                service: Some("Disney".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(moved.kind(), ErrorKind::InvalidState);
    assert_eq!(
        pool.get_stock_item(&admin, item.id).await.unwrap().service,
        "Netflix"
    );

    let second = pool.create_sale(&ana, "Netflix", None).await.unwrap();
    assert_eq!(
        pool.assign(&admin, second.id, item.id, None)
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::StockNotEligible
    );
}

#[tokio::test]
async fn open_uses_configured_database_path() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut config = config();
    config.storage.database_path = Some(dir.path().join("data").join("stockpool.db"));

    let pool = Stockpool::open(&config).await.unwrap();
    let admin = pool.login_admin("admin123").unwrap();
    pool.add_stock(&admin, "Disney", "pw", None, None)
        .await
        .unwrap();

    assert!(dir.path().join("data").join("stockpool.db").exists());
    assert_eq!(pool.catalog().await.unwrap(), ["Disney"]);
}
