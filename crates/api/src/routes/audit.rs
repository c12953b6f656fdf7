//! Route definitions for audit log queries.

use axum::routing::get;
use axum::Router;

use crate::handlers::audit;
use crate::state::AppState;

/// Audit routes mounted at `/audit`.
///
/// ```text
/// GET    /    -> query_audit
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(audit::query_audit))
}
