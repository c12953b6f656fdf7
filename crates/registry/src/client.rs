//! REST client for the advisor registry lookup endpoint.

use std::time::Duration;

use serde::Deserialize;

use advlink_core::types::CrdNumber;

/// HTTP request timeout for a single registry call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the registry client.
///
/// Both variants are transient from the scheduler's perspective: a failed
/// candidate is recorded in the run's error list and retried on a later run.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The registry returned a non-2xx status code.
    #[error("Registry API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

// ---------------------------------------------------------------------------
// AdvisorRecord
// ---------------------------------------------------------------------------

/// An advisor's current registration as returned by the registry.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisorRecord {
    pub crd_number: CrdNumber,
    pub name: String,
    /// Name of the firm the advisor is currently registered with.
    pub firm_name: String,
    pub firm_crd: CrdNumber,
    /// Registration effective date, ISO-8601 (`YYYY-MM-DD`), when reported.
    pub registered_date: Option<String>,
    /// Upstream record identifier, kept for traceability.
    pub record_ref: Option<String>,
}

// ---------------------------------------------------------------------------
// AdvisorLookup trait
// ---------------------------------------------------------------------------

/// Lookup seam used by the reconciliation scheduler.
///
/// Returns `Ok(Some(record))` when the candidate is currently affiliated
/// with the given firm, `Ok(None)` when not (or unknown to the registry).
#[async_trait::async_trait]
pub trait AdvisorLookup: Send + Sync {
    async fn lookup(
        &self,
        crd_number: CrdNumber,
        firm_crd: CrdNumber,
    ) -> Result<Option<AdvisorRecord>, RegistryError>;
}

// ---------------------------------------------------------------------------
// RegistryClient
// ---------------------------------------------------------------------------

/// HTTP client for the advisor registry.
pub struct RegistryClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl RegistryClient {
    /// Create a new registry client.
    ///
    /// * `api_url` - base URL, e.g. `https://registry.example.com/api`.
    /// * `api_key` - bearer token, when the registry requires one.
    pub fn new(api_url: String, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            api_url,
            api_key,
        }
    }

    /// Build a client from `REGISTRY_API_URL` / `REGISTRY_API_KEY`.
    ///
    /// Returns `None` when the URL is unset: the reconciliation feature then
    /// degrades to a no-op, which callers log as a warning.
    pub fn from_env() -> Option<Self> {
        let api_url = std::env::var("REGISTRY_API_URL").ok()?;
        let api_key = std::env::var("REGISTRY_API_KEY").ok();
        Some(Self::new(api_url, api_key))
    }

    /// Ensure the response has a success status code, or capture status and
    /// body into a [`RegistryError::Api`].
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RegistryError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RegistryError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl AdvisorLookup for RegistryClient {
    /// Query the registry for the candidate's current firm affiliation.
    ///
    /// Sends `GET {api_url}/advisors/{crd}?firm_crd={firm_crd}`. A 404 from
    /// the registry means the candidate is unknown or unaffiliated and maps
    /// to `Ok(None)` rather than an error.
    async fn lookup(
        &self,
        crd_number: CrdNumber,
        firm_crd: CrdNumber,
    ) -> Result<Option<AdvisorRecord>, RegistryError> {
        let mut request = self
            .client
            .get(format!("{}/advisors/{crd_number}", self.api_url))
            .query(&[("firm_crd", firm_crd)]);

        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::ensure_success(response).await?;
        let record = response.json::<AdvisorRecord>().await?;

        Ok(affiliation(record, firm_crd))
    }
}

/// Keep the record only when it shows a current affiliation with the firm.
///
/// The registry may return the advisor's record even when they are
/// registered elsewhere; only a firm match counts as affiliation.
fn affiliation(record: AdvisorRecord, firm_crd: CrdNumber) -> Option<AdvisorRecord> {
    if record.firm_crd != firm_crd {
        return None;
    }
    Some(record)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(crd: CrdNumber, firm_crd: CrdNumber) -> AdvisorRecord {
        AdvisorRecord {
            crd_number: crd,
            name: "Dana Pruitt".to_string(),
            firm_name: "Meridian Wealth".to_string(),
            firm_crd,
            registered_date: Some("2024-03-01".to_string()),
            record_ref: Some("reg-1".to_string()),
        }
    }

    #[test]
    fn matching_firm_counts_as_affiliation() {
        let found = affiliation(record(123456, 99001), 99001);
        assert_eq!(found.map(|r| r.crd_number), Some(123456));
    }

    #[test]
    fn other_firm_is_not_an_affiliation() {
        assert!(affiliation(record(123456, 77002), 99001).is_none());
    }

    #[test]
    fn record_parses_without_optional_fields() {
        let payload = serde_json::json!({
            "crd_number": 123456,
            "name": "Dana Pruitt",
            "firm_name": "Meridian Wealth",
            "firm_crd": 99001
        });
        let record: AdvisorRecord = serde_json::from_value(payload).unwrap();
        assert_eq!(record.firm_crd, 99001);
        assert!(record.registered_date.is_none());
        assert!(record.record_ref.is_none());
    }
}
