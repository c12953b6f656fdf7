//! Route definitions for introductions.
//!
//! Two routers: the partner-facing surface at `/introductions`, and the
//! admin surface at `/admin/introductions`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::introductions;
use crate::state::AppState;

/// Partner-facing routes mounted at `/introductions`.
///
/// ```text
/// POST   /         -> create_introduction (idempotent)
/// GET    /         -> list_own_introductions
/// GET    /{id}     -> get_own_introduction
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(introductions::list_own_introductions).post(introductions::create_introduction),
        )
        .route("/{id}", get(introductions::get_own_introduction))
}

/// Admin routes mounted at `/admin/introductions`.
///
/// ```text
/// GET    /                -> admin_list_introductions
/// PATCH  /{id}/status     -> update_introduction_status (expire/cancel)
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(introductions::admin_list_introductions))
        .route("/{id}/status", patch(introductions::update_introduction_status))
}
