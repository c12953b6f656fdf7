//! Route definitions for summary statistics.

use axum::routing::get;
use axum::Router;

use crate::handlers::stats;
use crate::state::AppState;

/// Stats routes mounted at `/stats`.
///
/// ```text
/// GET    /summary    -> get_summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/summary", get(stats::get_summary))
}
