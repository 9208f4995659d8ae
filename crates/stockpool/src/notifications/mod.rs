//! "New pending order" notifications.
//!
//! Delivery is fire-and-forget: [`dispatch`] runs the notifier on a task
//! registered with a [`TaskTracker`] and only logs failures. A failed
//! notification never changes sale state; the order stays discoverable
//! through the pending list. Owners wait on the tracker before exiting so
//! the attempt is not cut short.
//!
//! - [`LogNotifier`] writes the order to the log (the default)
//! - `WebhookNotifier` POSTs it as JSON (`webhook-notifications` feature)

mod log_notifier;
#[cfg(feature = "webhook-notifications")]
mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

pub use log_notifier::LogNotifier;
#[cfg(feature = "webhook-notifications")]
pub use webhook::WebhookNotifier;

/// Errors that can occur while delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The notifier could not be set up.
    #[error("Notifier configuration error: {0}")]
    Config(String),

    /// The request never got a response.
    #[error("Notification request error: {0}")]
    Request(String),

    /// The receiver answered with a non-success status.
    #[error("Notification endpoint error (status {status}): {body}")]
    ApiError { status: u16, body: String },
}

/// A sale that just entered the pending queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    pub sale_id: i64,
    pub service: String,
    pub client_id: i64,
    pub client_phone: String,
    pub client_name: String,
    pub payment_reference: Option<String>,
    pub created_at: i64,
}

/// Receives new pending orders.
#[async_trait]
pub trait OrderNotifier: Send + Sync + std::fmt::Debug {
    async fn notify_new_order(&self, order: &NewOrder) -> Result<(), NotificationError>;
}

/// Deliver `order` in the background on a task tracked by `tasks`.
pub fn dispatch(
    tasks: &TaskTracker,
    notifier: Arc<dyn OrderNotifier>,
    order: NewOrder,
) -> JoinHandle<()> {
    tasks.spawn(async move {
        match notifier.notify_new_order(&order).await {
            Ok(()) => debug!(sale_id = order.sale_id, "New order notification delivered"),
            Err(e) => warn!(
                sale_id = order.sale_id,
                error = %e,
                "New order notification failed; sale stays pending"
            ),
        }
    })
}
