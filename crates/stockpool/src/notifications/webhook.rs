//! Webhook notifier: POSTs each new order as JSON.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{NewOrder, NotificationError, OrderNotifier};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    http: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Result<Self, NotificationError> {
        if url.trim().is_empty() {
            return Err(NotificationError::Config("webhook url is empty".to_string()));
        }

        // reqwest is built with rustls-no-provider; Err means already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NotificationError::Config(e.to_string()))?;

        Ok(Self {
            http,
            url: url.trim().to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl OrderNotifier for WebhookNotifier {
    async fn notify_new_order(&self, order: &NewOrder) -> Result<(), NotificationError> {
        let response = self
            .http
            .post(&self.url)
            .json(order)
            .send()
            .await
            .map_err(|e| NotificationError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(sale_id = order.sale_id, "Webhook accepted new order");
            Ok(())
        } else {
            let status_code = status.as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            warn!(status = status_code, body = %body, "Webhook returned error");
            Err(NotificationError::ApiError {
                status: status_code,
                body,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notifications::tests::sample_order;

    #[test]
    fn empty_url_is_rejected() {
        assert!(matches!(
            WebhookNotifier::new("  "),
            Err(NotificationError::Config(_))
        ));
    }

    #[test]
    fn url_is_trimmed() {
        let notifier = WebhookNotifier::new(" http://127.0.0.1:9/orders ").unwrap();
        assert_eq!(notifier.url(), "http://127.0.0.1:9/orders");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_request_error() {
        // Port 9 (discard) is closed on loopback in test environments.
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/orders").unwrap();
        let err = notifier.notify_new_order(&sample_order()).await.unwrap_err();
        assert!(matches!(err, NotificationError::Request(_)));
    }
}
