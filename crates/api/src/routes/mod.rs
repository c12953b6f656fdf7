pub mod audit;
pub mod health;
pub mod hires;
pub mod introductions;
pub mod partners;
pub mod placements;
pub mod reconciliation;
pub mod stats;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /introductions                          list own, create (partner auth)
/// /introductions/{id}                     get own (partner auth)
///
/// /placements                             list own (partner), create (admin)
///
/// /partners                               list, create (admin)
/// /partners/{id}                          get, update
/// /partners/{id}/rotate-secret            rotate API secret (POST)
/// /partners/{id}/active                   activate/deactivate (PUT)
///
/// /hires                                  list, create (admin)
/// /hires/{id}                             get
/// /hires/{id}/termination                 set termination date (PATCH)
/// /hires/{id}/match                       manual attribution (POST)
///
/// /admin/introductions                    list all (admin)
/// /admin/introductions/{id}/status        expire/cancel (PATCH)
/// /admin/placements                       list all (admin)
/// /admin/placements/{id}                  get
/// /admin/placements/{id}/status           advance billing status (PATCH)
///
/// /stats/summary                          ledger totals + fee sums (admin)
///
/// /reconciliation/run                     trigger run (POST, admin)
/// /reconciliation/status                  breaker state + last run (admin)
/// /reconciliation/breaker/reset           reset failure counter (POST, admin)
///
/// /audit                                  query audit trail (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Partner-facing surface.
        .nest("/introductions", introductions::router())
        .nest("/placements", placements::router())
        // Admin surface.
        .nest("/partners", partners::router())
        .nest("/hires", hires::router())
        .nest("/admin/introductions", introductions::admin_router())
        .nest("/admin/placements", placements::admin_router())
        .nest("/stats", stats::router())
        .nest("/reconciliation", reconciliation::router())
        .nest("/audit", audit::router())
}
