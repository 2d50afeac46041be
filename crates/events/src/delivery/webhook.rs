//! Webhook delivery with exponential-backoff retry.
//!
//! [`WebhookDelivery`] POSTs a JSON notification to an external URL. Failed
//! attempts are retried after 1 s, 2 s and 4 s.

use std::time::Duration;

use formkit_core::automation::Notification;

/// Default backoff between attempts.
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// Network, DNS, timeout or other request failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

/// Delivers notifications to webhook endpoints.
pub struct WebhookDelivery {
    client: reqwest::Client,
    retry_delays: Vec<Duration>,
}

impl WebhookDelivery {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self {
            client,
            retry_delays: RETRY_DELAYS_SECS
                .iter()
                .map(|s| Duration::from_secs(*s))
                .collect(),
        }
    }

    /// Replace the backoff schedule; an empty schedule means a single
    /// attempt.
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    /// JSON body sent for a notification.
    pub fn payload(notification: &Notification) -> serde_json::Value {
        serde_json::json!({
            "event_type": "automation.notification",
            "rule_id": notification.rule_id,
            "form_id": notification.form_id,
            "submission_id": notification.submission_id,
            "subject": notification.subject,
            "body": notification.body,
            "sent_at": chrono::Utc::now(),
        })
    }

    /// POST the notification to `notification.recipient`, retrying on
    /// failure. Returns the last error once the schedule is exhausted.
    pub async fn deliver(&self, notification: &Notification) -> Result<(), WebhookError> {
        let url = notification.recipient.as_str();
        let payload = Self::payload(notification);

        for (attempt, delay) in self.retry_delays.iter().enumerate() {
            match self.try_send(url, &payload).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        url,
                        error = %e,
                        "Webhook delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(*delay).await;
                }
            }
        }

        self.try_send(url, &payload).await.inspect_err(|e| {
            tracing::warn!(url, error = %e, "Webhook delivery failed after all retries");
        })
    }

    async fn try_send(&self, url: &str, payload: &serde_json::Value) -> Result<(), WebhookError> {
        let response = self.client.post(url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(WebhookError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

impl Default for WebhookDelivery {
    fn default() -> Self {
        Self::new()
    }
}
