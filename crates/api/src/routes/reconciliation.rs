//! Route definitions for the reconciliation admin surface.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::reconciliation;
use crate::state::AppState;

/// Reconciliation routes mounted at `/reconciliation`.
///
/// ```text
/// POST   /run              -> trigger_run
/// GET    /status           -> get_status
/// POST   /breaker/reset    -> reset_breaker
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/run", post(reconciliation::trigger_run))
        .route("/status", get(reconciliation::get_status))
        .route("/breaker/reset", post(reconciliation::reset_breaker))
}
