//! Handlers for placements.
//!
//! Placements are normally created by the attribution engine; the manual
//! create endpoint exists for operator corrections and goes through the
//! same engine path, so every guard (window, status, uniqueness) applies.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use advlink_core::audit::{entity_types, event_types, sources};
use advlink_core::error::CoreError;
use advlink_core::status::PlacementStatus;
use advlink_core::types::DbId;
use advlink_db::models::audit::CreateAuditLog;
use advlink_db::models::placement::{CreatePlacement, PlacementQuery, UpdatePlacementStatus};
use advlink_db::repositories::placement_repo::PlacementRepo;

use crate::engine::attribution;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthPartner, RequireAdmin};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/placements
///
/// Manually attribute an introduction to a hire. Subject to the same
/// validation as engine-created placements: the introduction must be open,
/// the CRD numbers must match, and the hire must fall inside the window.
pub async fn create_placement(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreatePlacement>,
) -> AppResult<impl IntoResponse> {
    let placement = attribution::create_placement(
        &state,
        input.introduction_id,
        input.hire_id,
        input.fee_override,
        input.fee_currency,
    )
    .await?;

    tracing::info!(
        placement_id = placement.id,
        introduction_id = placement.introduction_id,
        hire_id = placement.hire_id,
        "Placement created manually"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: placement })))
}

/// GET /api/v1/placements
///
/// List the authenticated partner's own placements.
pub async fn list_own_placements(
    AuthPartner(partner): AuthPartner,
    State(state): State<AppState>,
    Query(mut params): Query<PlacementQuery>,
) -> AppResult<impl IntoResponse> {
    params.partner_id = Some(partner.id);

    let placements = PlacementRepo::list(&state.pool, &params).await?;

    Ok(Json(DataResponse { data: placements }))
}

/// GET /api/v1/admin/placements
///
/// List placements across all partners, with filters.
pub async fn admin_list_placements(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PlacementQuery>,
) -> AppResult<impl IntoResponse> {
    let placements = PlacementRepo::list(&state.pool, &params).await?;

    Ok(Json(DataResponse { data: placements }))
}

/// GET /api/v1/admin/placements/{id}
pub async fn get_placement(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(placement_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let placement = PlacementRepo::find_by_id(&state.pool, placement_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Placement",
            id: placement_id,
        }))?;

    Ok(Json(DataResponse { data: placement }))
}

/// PATCH /api/v1/admin/placements/{id}/status
///
/// Advance the billing lifecycle (notified, invoiced, paid, disputed).
/// `pending_notify` is the initial state and cannot be re-entered.
/// Setting the current status again is a no-op.
pub async fn update_placement_status(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(placement_id): Path<DbId>,
    Json(input): Json<UpdatePlacementStatus>,
) -> AppResult<impl IntoResponse> {
    let target: PlacementStatus = input.status.parse()?;

    if target == PlacementStatus::PendingNotify {
        return Err(AppError::Core(CoreError::Validation(
            "status 'pending_notify' is the initial state and cannot be set".into(),
        )));
    }

    let current = PlacementRepo::find_by_id(&state.pool, placement_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Placement",
            id: placement_id,
        }))?;

    if current.status == target.as_str() {
        return Ok(Json(DataResponse { data: current }));
    }

    let updated = PlacementRepo::update_status(&state.pool, placement_id, target)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Placement",
            id: placement_id,
        }))?;

    crate::audit::record(
        &state.pool,
        CreateAuditLog {
            entity_type: entity_types::PLACEMENT,
            entity_id: Some(placement_id),
            event_type: event_types::STATUS_CHANGED,
            old_value: Some(serde_json::json!({ "status": current.status })),
            new_value: Some(serde_json::json!({ "status": updated.status })),
            source: sources::ADMIN_API,
        },
    )
    .await;

    tracing::info!(
        placement_id,
        from = %current.status,
        to = %updated.status,
        "Placement status changed"
    );

    Ok(Json(DataResponse { data: updated }))
}
