//! Route definitions for the hire ledger (admin only).

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::hires;
use crate::state::AppState;

/// Hire routes mounted at `/hires`.
///
/// ```text
/// GET    /                    -> list_hires
/// POST   /                    -> create_hire (idempotent, triggers attribution)
/// GET    /{id}                -> get_hire
/// PATCH  /{id}/termination    -> set_termination
/// POST   /{id}/match          -> match_hire (manual attribution)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(hires::list_hires).post(hires::create_hire))
        .route("/{id}", get(hires::get_hire))
        .route("/{id}/termination", patch(hires::set_termination))
        .route("/{id}/match", post(hires::match_hire))
}
