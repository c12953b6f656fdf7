//! Handlers for the hire ledger (admin only).
//!
//! Manually recorded hires run through the same idempotent create as the
//! reconciliation job. A genuinely new hire is immediately fed to the
//! attribution engine; the created placement, if any, rides along in the
//! response.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use advlink_core::audit::{entity_types, event_types, sources};
use advlink_core::error::CoreError;
use advlink_core::status::HireSource;
use advlink_core::types::DbId;
use advlink_db::models::audit::CreateAuditLog;
use advlink_db::models::hire::{CreateHire, Hire, HireQuery, SetTermination};
use advlink_db::models::placement::Placement;
use advlink_db::repositories::hire_repo::HireRepo;

use crate::engine::attribution;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response for hire creation: the hire plus the placement attribution
/// produced, when the hire was new and matched an open introduction.
#[derive(Debug, Serialize)]
pub struct HireCreated {
    #[serde(flatten)]
    pub hire: Hire,
    pub placement: Option<Placement>,
}

/// Request body for recording a hire.
///
/// `source` is optional and defaults to `manual`; internal onboarding feeds
/// may tag their records `onboarding`. The `registry_sync` tag is reserved
/// for the reconciliation job.
#[derive(Debug, Deserialize)]
pub struct CreateHireRequest {
    #[serde(flatten)]
    pub hire: CreateHire,
    pub source: Option<HireSource>,
}

/// POST /api/v1/hires
///
/// Record a hire. Returns 201 and triggers attribution for a new hire;
/// a duplicate `(crd_number, firm_name, hire_date)` triple returns the
/// existing row with 200 and no attribution attempt.
pub async fn create_hire(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateHireRequest>,
) -> AppResult<impl IntoResponse> {
    validate_hire(&input.hire)?;

    let source = input.source.unwrap_or(HireSource::Manual);
    if source == HireSource::RegistrySync {
        return Err(AppError::Core(CoreError::Validation(
            "Hire source registry_sync is reserved for the reconciliation job".into(),
        )));
    }

    let result = HireRepo::create(&state.pool, &input.hire, source).await?;

    if !result.created {
        return Ok((
            StatusCode::OK,
            Json(DataResponse {
                data: HireCreated {
                    hire: result.hire,
                    placement: None,
                },
            }),
        ));
    }

    crate::audit::record(
        &state.pool,
        CreateAuditLog {
            entity_type: entity_types::HIRE,
            entity_id: Some(result.hire.id),
            event_type: event_types::CREATED,
            old_value: None,
            new_value: serde_json::to_value(&result.hire).ok(),
            source: sources::ADMIN_API,
        },
    )
    .await;

    tracing::info!(
        hire_id = result.hire.id,
        crd_number = result.hire.crd_number,
        "Hire recorded"
    );

    let placement = attribution::match_hire_to_introductions(&state, result.hire.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: HireCreated {
                hire: result.hire,
                placement,
            },
        }),
    ))
}

/// GET /api/v1/hires
pub async fn list_hires(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<HireQuery>,
) -> AppResult<impl IntoResponse> {
    let hires = HireRepo::list(&state.pool, &params).await?;

    Ok(Json(DataResponse { data: hires }))
}

/// GET /api/v1/hires/{id}
pub async fn get_hire(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(hire_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let hire = HireRepo::find_by_id(&state.pool, hire_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Hire",
            id: hire_id,
        }))?;

    Ok(Json(DataResponse { data: hire }))
}

/// PATCH /api/v1/hires/{id}/termination
///
/// Record the advisor's departure date. Informational only; existing
/// placements are not altered.
pub async fn set_termination(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(hire_id): Path<DbId>,
    Json(input): Json<SetTermination>,
) -> AppResult<impl IntoResponse> {
    let before = HireRepo::find_by_id(&state.pool, hire_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Hire",
            id: hire_id,
        }))?;

    if input.termination_date < before.hire_date {
        return Err(AppError::Core(CoreError::Validation(
            "termination_date must not precede hire_date".into(),
        )));
    }

    let hire = HireRepo::set_termination_date(&state.pool, hire_id, input.termination_date)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Hire",
            id: hire_id,
        }))?;

    crate::audit::record(
        &state.pool,
        CreateAuditLog {
            entity_type: entity_types::HIRE,
            entity_id: Some(hire_id),
            event_type: event_types::TERMINATION_SET,
            old_value: Some(serde_json::json!({ "termination_date": before.termination_date })),
            new_value: Some(serde_json::json!({ "termination_date": hire.termination_date })),
            source: sources::ADMIN_API,
        },
    )
    .await;

    tracing::info!(hire_id, termination_date = %input.termination_date, "Hire termination recorded");

    Ok(Json(DataResponse { data: hire }))
}

/// POST /api/v1/hires/{id}/match
///
/// Re-run attribution for an existing hire. Useful after an introduction
/// arrives late or an erroneous placement was cleared. Returns the new
/// placement, or null when no open introduction qualifies.
pub async fn match_hire(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(hire_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let placement = attribution::match_hire_to_introductions(&state, hire_id).await?;

    Ok(Json(DataResponse { data: placement }))
}

fn validate_hire(input: &CreateHire) -> AppResult<()> {
    if input.crd_number <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "crd_number must be a positive integer".into(),
        )));
    }
    if input.advisor_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "advisor_name must not be empty".into(),
        )));
    }
    if input.firm_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "firm_name must not be empty".into(),
        )));
    }
    Ok(())
}
