//! Webhook notification delivery with bounded retry.
//!
//! [`WebhookNotifier`] POSTs a JSON placement summary to the partner's
//! configured endpoint, signed with HMAC-SHA256 when the partner has a
//! signing secret. Failed attempts retry with exponential backoff
//! (1 s, 2 s, 4 s) before the attempt is reported as failed; the placement
//! then stays `pending_notify` for a later retry sweep.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;

use advlink_core::secrets::compute_notification_hmac;
use advlink_core::types::{CrdNumber, DbId, Timestamp};

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the HMAC-SHA256 signature of the request body.
const SIGNATURE_HEADER: &str = "x-advlink-signature";

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// The placement summary delivered to a partner.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementSummary {
    pub placement_id: DbId,
    pub introduction_id: DbId,
    pub crd_number: CrdNumber,
    pub advisor_name: String,
    pub hire_date: chrono::NaiveDate,
    pub fee_amount: Decimal,
    pub fee_currency: String,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Error / outcome
// ---------------------------------------------------------------------------

/// Error type for notification delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The partner endpoint returned a non-2xx status code.
    #[error("Notification endpoint returned HTTP {0}")]
    HttpStatus(u16),
}

/// What happened to a notification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Delivered successfully.
    Delivered,
    /// The partner has no notification endpoint configured; nothing to do.
    Skipped,
}

// ---------------------------------------------------------------------------
// Notifier trait
// ---------------------------------------------------------------------------

/// Delivery seam for partner notifications.
///
/// `notify_url`/`notify_secret` come from the partner row; a partner without
/// an endpoint yields [`NotifyOutcome::Skipped`] (treated as success -- the
/// partner opted out of push notification).
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        notify_url: Option<&str>,
        notify_secret: Option<&str>,
        summary: &PlacementSummary,
    ) -> Result<NotifyOutcome, NotifyError>;
}

// ---------------------------------------------------------------------------
// WebhookNotifier
// ---------------------------------------------------------------------------

/// Delivers placement summaries to partner webhook endpoints.
pub struct WebhookNotifier {
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Create a new notifier with a pre-configured HTTP client.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client }
    }

    /// Send one delivery attempt.
    async fn try_send(
        &self,
        url: &str,
        secret: Option<&str>,
        body: &str,
    ) -> Result<(), NotifyError> {
        let mut request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string());

        if let Some(secret) = secret {
            request = request.header(SIGNATURE_HEADER, compute_notification_hmac(secret, body));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::HttpStatus(status.as_u16()));
        }
        Ok(())
    }
}

impl Default for WebhookNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    /// Deliver a placement summary with retry.
    ///
    /// Retries up to 3 times with exponential backoff before giving up.
    /// Returns `Ok` on the first successful attempt.
    async fn notify(
        &self,
        notify_url: Option<&str>,
        notify_secret: Option<&str>,
        summary: &PlacementSummary,
    ) -> Result<NotifyOutcome, NotifyError> {
        let Some(url) = notify_url else {
            return Ok(NotifyOutcome::Skipped);
        };

        let body = serde_json::to_string(summary)
            .expect("PlacementSummary serialization cannot fail");

        let mut last_err: Option<NotifyError> = None;

        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(url, notify_secret, &body).await {
                Ok(()) => {
                    tracing::info!(
                        placement_id = summary.placement_id,
                        url,
                        "Partner notification delivered"
                    );
                    return Ok(NotifyOutcome::Delivered);
                }
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        placement_id = summary.placement_id,
                        url,
                        error = %e,
                        "Partner notification attempt failed, retrying"
                    );
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        // One final attempt after the last backoff.
        match self.try_send(url, notify_secret, &body).await {
            Ok(()) => {
                tracing::info!(
                    placement_id = summary.placement_id,
                    url,
                    "Partner notification delivered"
                );
                Ok(NotifyOutcome::Delivered)
            }
            Err(e) => {
                tracing::error!(
                    placement_id = summary.placement_id,
                    url,
                    error = %e,
                    "Partner notification failed after all retries"
                );
                Err(last_err.unwrap_or(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_does_not_panic() {
        let _notifier = WebhookNotifier::new();
    }

    #[test]
    fn notify_error_display_http_status() {
        let err = NotifyError::HttpStatus(502);
        assert_eq!(err.to_string(), "Notification endpoint returned HTTP 502");
    }

    #[tokio::test]
    async fn missing_endpoint_is_a_skip() {
        let notifier = WebhookNotifier::new();
        let summary = PlacementSummary {
            placement_id: 1,
            introduction_id: 2,
            crd_number: 555,
            advisor_name: "Jordan Blake".into(),
            hire_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            fee_amount: Decimal::ZERO,
            fee_currency: "USD".into(),
            created_at: chrono::Utc::now(),
        };

        let outcome = notifier.notify(None, None, &summary).await.unwrap();
        assert_eq!(outcome, NotifyOutcome::Skipped);
    }
}
