//! Delivery-gateway handoff with exponential-backoff retry.
//!
//! [`WebhookMessenger`] POSTs a JSON-encoded [`OutboundMessage`] to an
//! external gateway that owns actual SMS/push delivery. Failed attempts are
//! retried up to three times with exponential backoff (1 s, 2 s, 4 s).

use std::time::Duration;

use async_trait::async_trait;

use crate::{DeliveryError, Messenger, OutboundMessage};

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// WebhookMessenger
// ---------------------------------------------------------------------------

/// Hands outbound messages to an external delivery gateway over HTTP.
pub struct WebhookMessenger {
    client: reqwest::Client,
    url: String,
}

impl WebhookMessenger {
    /// Create a new gateway messenger targeting `url`.
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            url: url.into(),
        }
    }

    /// Build from the `MESSAGING_GATEWAY_URL` environment variable, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var("MESSAGING_GATEWAY_URL").ok().map(Self::new)
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, payload: &serde_json::Value) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(DeliveryError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl Messenger for WebhookMessenger {
    /// Deliver a message to the gateway with retry.
    ///
    /// Retries up to 3 times with exponential backoff before giving up.
    /// Returns `Ok(())` on the first successful attempt.
    async fn send(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        let payload = serde_json::json!({
            "channel": message.channel,
            "recipient": message.recipient,
            "subject": message.subject,
            "body": message.body,
        });

        let mut last_err: Option<DeliveryError> = None;

        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(&payload).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        url = %self.url,
                        error = %e,
                        "Gateway delivery attempt failed, retrying"
                    );
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        // Final attempt after the last backoff.
        match self.try_send(&payload).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(url = %self.url, error = %e, "Gateway delivery failed after all retries");
                Err(last_err.unwrap_or(e))
            }
        }
    }
}
