//! Completion notifications.
//!
//! When the final is scored the engine posts a [`WebhookPayload`] to the
//! tournament's webhook URL. Delivery is fire-and-forget: it runs on its own
//! task and a failure is only logged.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::tournament::{ParticipantId, TournamentId};

/// Body sent when a tournament completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub tournament_id: TournamentId,
    pub winner_id: ParticipantId,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Webhook delivery failed: {0}")]
    Delivery(String),

    #[error("Webhook endpoint answered with status {0}")]
    Status(u16),
}

/// Outbound channel for completion notifications
#[async_trait]
pub trait WebhookSink: Send + Sync {
    async fn notify(&self, url: &str, payload: &WebhookPayload) -> Result<(), WebhookError>;
}

/// Drops every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWebhookSink;

#[async_trait]
impl WebhookSink for NoopWebhookSink {
    async fn notify(&self, _url: &str, _payload: &WebhookPayload) -> Result<(), WebhookError> {
        Ok(())
    }
}

/// Forwards `(url, payload)` pairs to a channel, for tests
#[derive(Debug, Clone)]
pub struct ChannelWebhookSink {
    tx: mpsc::UnboundedSender<(String, WebhookPayload)>,
}

impl ChannelWebhookSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(String, WebhookPayload)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl WebhookSink for ChannelWebhookSink {
    async fn notify(&self, url: &str, payload: &WebhookPayload) -> Result<(), WebhookError> {
        self.tx
            .send((url.to_string(), payload.clone()))
            .map_err(|e| WebhookError::Delivery(e.to_string()))
    }
}

/// Deliver on a background task; never blocks or fails the caller
pub(crate) fn dispatch(sink: Arc<dyn WebhookSink>, url: String, payload: WebhookPayload) {
    tokio::spawn(async move {
        match sink.notify(&url, &payload).await {
            Ok(()) => log::info!(
                "Sent completion webhook for tournament {} to {}",
                payload.tournament_id,
                url
            ),
            Err(e) => log::warn!(
                "Completion webhook for tournament {} to {} failed: {}",
                payload.tournament_id,
                url,
                e
            ),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn payload() -> WebhookPayload {
        WebhookPayload {
            tournament_id: Uuid::from_u128(1),
            winner_id: Uuid::from_u128(2),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_payload_field_names() {
        let json = serde_json::to_value(payload()).unwrap();
        assert!(json.get("tournamentId").is_some());
        assert!(json.get("winnerId").is_some());
        assert!(json.get("completedAt").is_some());
    }

    #[tokio::test]
    async fn test_dispatch_reaches_sink() {
        let (sink, mut rx) = ChannelWebhookSink::new();
        let sent = payload();
        dispatch(Arc::new(sink), "http://hooks.test/done".to_string(), sent.clone());

        let (url, received) = rx.recv().await.unwrap();
        assert_eq!(url, "http://hooks.test/done");
        assert_eq!(received, sent);
    }

    #[tokio::test]
    async fn test_dispatch_swallows_failures() {
        let (sink, rx) = ChannelWebhookSink::new();
        drop(rx);
        // Receiver gone: notify fails, dispatch only logs
        dispatch(Arc::new(sink), "http://hooks.test/done".to_string(), payload());
        tokio::task::yield_now().await;
    }
}
