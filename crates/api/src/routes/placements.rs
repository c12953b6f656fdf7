//! Route definitions for placements.
//!
//! `/placements` carries the partner-facing list and the admin-only manual
//! create on the same path; the auth extractors differ per handler. The
//! remaining admin surface lives at `/admin/placements`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::placements;
use crate::state::AppState;

/// Routes mounted at `/placements`.
///
/// ```text
/// GET    /     -> list_own_placements (partner)
/// POST   /     -> create_placement (admin, engine-validated)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(placements::list_own_placements).post(placements::create_placement),
    )
}

/// Admin routes mounted at `/admin/placements`.
///
/// ```text
/// GET    /                -> admin_list_placements
/// GET    /{id}            -> get_placement
/// PATCH  /{id}/status     -> update_placement_status
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(placements::admin_list_placements))
        .route("/{id}", get(placements::get_placement))
        .route("/{id}/status", patch(placements::update_placement_status))
}
