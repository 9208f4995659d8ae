//! Notifier that only logs.

use async_trait::async_trait;
use tracing::info;

use super::{NewOrder, NotificationError, OrderNotifier};

/// Logs each new order. Used when no delivery channel is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl OrderNotifier for LogNotifier {
    async fn notify_new_order(&self, order: &NewOrder) -> Result<(), NotificationError> {
        info!(
            sale_id = order.sale_id,
            service = %order.service,
            client_phone = %order.client_phone,
            client_name = %order.client_name,
            "New pending order received; configure a webhook to forward it"
        );
        Ok(())
    }
}
