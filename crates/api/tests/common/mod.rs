//! Shared helpers for API integration tests.
//!
//! Builds the full application router through [`build_app_router`] so tests
//! exercise the same middleware stack production uses, plus request helpers
//! and database seeding shortcuts.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use advlink_api::background::reconciliation::ReconciliationService;
use advlink_api::config::ServerConfig;
use advlink_api::router::build_app_router;
use advlink_api::state::AppState;
use advlink_core::secrets;
use advlink_db::models::partner::{CreatePartner, Partner};
use advlink_db::repositories::partner_repo::PartnerRepo;
use advlink_registry::AdvisorLookup;

/// Bearer token accepted by admin endpoints in tests.
pub const ADMIN_TOKEN: &str = "test-admin-token";

/// Firm CRD used by reconciliation tests.
pub const FIRM_CRD: i64 = 99001;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        admin_token: Some(ADMIN_TOKEN.to_string()),
        firm_crd: Some(FIRM_CRD),
        reconcile_interval_secs: 604_800,
        reconcile_lookup_delay_ms: 0,
    }
}

/// Build an `AppState` without a registry client (reconciliation degraded).
pub fn test_state(pool: PgPool) -> AppState {
    test_state_with_lookup(pool, None)
}

/// Build an `AppState` with an injected registry lookup stub.
pub fn test_state_with_lookup(pool: PgPool, lookup: Option<Arc<dyn AdvisorLookup>>) -> AppState {
    let config = test_config();
    let reconciliation = Arc::new(ReconciliationService::new(
        lookup,
        config.firm_crd,
        Duration::from_millis(config.reconcile_lookup_delay_ms),
    ));

    AppState {
        pool,
        config: Arc::new(config),
        notifier: Arc::new(advlink_events::WebhookNotifier::new()),
        reconciliation,
    }
}

/// Build the full application router with all middleware layers.
pub fn build_test_app(pool: PgPool) -> Router {
    let state = test_state(pool);
    let config = state.config.as_ref().clone();
    build_app_router(state, &config)
}

/// Build the router from a pre-built state (for tests that also drive the
/// state directly, e.g. reconciliation).
pub fn build_app_from_state(state: AppState) -> Router {
    let config = state.config.as_ref().clone();
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request with no auth.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a GET request with the admin bearer token.
pub async fn get_admin(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a GET request authenticated as a partner.
pub async fn get_partner(app: Router, uri: &str, api_secret: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("x-api-key", api_secret)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a JSON request with the admin bearer token.
pub async fn send_json_admin(
    app: Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {ADMIN_TOKEN}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a JSON request authenticated as a partner.
pub async fn send_json_partner(
    app: Router,
    method: &str,
    uri: &str,
    api_secret: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", api_secret)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the response status and return the parsed body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Create a partner directly in the database, returning the row and the
/// plaintext API secret for authenticating as that partner.
pub async fn seed_partner(pool: &PgPool, input: CreatePartner) -> (Partner, String) {
    let secret = secrets::generate_secret();
    let partner = PartnerRepo::create(pool, &input, &secret.hash, &secret.prefix)
        .await
        .expect("partner create failed");
    (partner, secret.plaintext)
}

/// A partner on a flat fee with a 12-month default window.
pub fn flat_fee_partner(name: &str) -> CreatePartner {
    CreatePartner {
        name: name.to_string(),
        fee_flat: Some(rust_decimal::Decimal::new(500_000, 2)),
        fee_percent: None,
        attribution_window_months: None,
        notify_url: None,
        notify_secret: None,
    }
}

/// A partner on percentage terms only (resolves to a zero fee).
pub fn percent_fee_partner(name: &str) -> CreatePartner {
    CreatePartner {
        name: name.to_string(),
        fee_flat: None,
        fee_percent: Some(rust_decimal::Decimal::new(1000, 2)),
        attribution_window_months: None,
        notify_url: None,
        notify_secret: None,
    }
}
