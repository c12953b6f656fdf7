//! Route definitions for partner administration.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::partners;
use crate::state::AppState;

/// Partner admin routes mounted at `/partners`.
///
/// ```text
/// GET    /                     -> list_partners
/// POST   /                     -> create_partner
/// GET    /{id}                 -> get_partner
/// PUT    /{id}                 -> update_partner
/// POST   /{id}/rotate-secret   -> rotate_secret
/// PUT    /{id}/active          -> set_active
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(partners::list_partners).post(partners::create_partner))
        .route("/{id}", get(partners::get_partner).put(partners::update_partner))
        .route("/{id}/rotate-secret", post(partners::rotate_secret))
        .route("/{id}/active", put(partners::set_active))
}
