//! HTTP delivery of completion webhooks.

use async_trait::async_trait;
use std::time::Duration;
use tourney::{
    WebhookPayload, WebhookSink,
    notify::WebhookError,
};

/// Posts the payload as JSON to the tournament's webhook URL
#[derive(Debug, Clone)]
pub struct HttpWebhookSink {
    client: reqwest::Client,
}

impl HttpWebhookSink {
    /// Create a new sink whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookSink for HttpWebhookSink {
    async fn notify(&self, url: &str, payload: &WebhookPayload) -> Result<(), WebhookError> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| WebhookError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebhookError::Status(status.as_u16()));
        }

        tracing::debug!(url = url, tournament_id = %payload.tournament_id, "Webhook delivered");
        Ok(())
    }
}
