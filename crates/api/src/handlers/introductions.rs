//! Handlers for partner-submitted introductions.
//!
//! Creation is idempotent on `(partner_id, crd_number, conversation_ref)`:
//! a repeat submission returns the existing row with 200 and fires no side
//! effects. Partners only ever see their own rows.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use advlink_core::audit::{entity_types, event_types, sources};
use advlink_core::error::CoreError;
use advlink_core::status::IntroductionStatus;
use advlink_core::types::DbId;
use advlink_db::models::audit::CreateAuditLog;
use advlink_db::models::introduction::{
    CreateIntroduction, IntroductionQuery, UpdateIntroductionStatus,
};
use advlink_db::repositories::introduction_repo::IntroductionRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthPartner, RequireAdmin};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/introductions
///
/// Record an introduction. Returns 201 with the new row, or 200 with the
/// existing row when the idempotency triple already exists.
pub async fn create_introduction(
    AuthPartner(partner): AuthPartner,
    State(state): State<AppState>,
    Json(input): Json<CreateIntroduction>,
) -> AppResult<impl IntoResponse> {
    validate_introduction(&input)?;

    let result = IntroductionRepo::create(&state.pool, partner.id, &input).await?;

    if result.created {
        crate::audit::record(
            &state.pool,
            CreateAuditLog {
                entity_type: entity_types::INTRODUCTION,
                entity_id: Some(result.introduction.id),
                event_type: event_types::CREATED,
                old_value: None,
                new_value: serde_json::to_value(&result.introduction).ok(),
                source: sources::PARTNER_API,
            },
        )
        .await;

        tracing::info!(
            introduction_id = result.introduction.id,
            partner_id = partner.id,
            crd_number = result.introduction.crd_number,
            "Introduction recorded"
        );
    }

    let status = if result.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(DataResponse {
            data: result.introduction,
        }),
    ))
}

/// GET /api/v1/introductions
///
/// List the authenticated partner's own introductions.
pub async fn list_own_introductions(
    AuthPartner(partner): AuthPartner,
    State(state): State<AppState>,
    Query(mut params): Query<IntroductionQuery>,
) -> AppResult<impl IntoResponse> {
    // Scope to the caller regardless of any partner_id filter supplied.
    params.partner_id = Some(partner.id);

    let introductions = IntroductionRepo::list(&state.pool, &params).await?;

    Ok(Json(DataResponse {
        data: introductions,
    }))
}

/// GET /api/v1/introductions/{id}
///
/// Fetch one of the authenticated partner's introductions. Rows belonging
/// to other partners read as not found.
pub async fn get_own_introduction(
    AuthPartner(partner): AuthPartner,
    State(state): State<AppState>,
    Path(introduction_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let introduction = IntroductionRepo::find_by_id(&state.pool, introduction_id)
        .await?
        .filter(|intro| intro.partner_id == partner.id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Introduction",
            id: introduction_id,
        }))?;

    Ok(Json(DataResponse { data: introduction }))
}

/// GET /api/v1/admin/introductions
///
/// List introductions across all partners, with filters.
pub async fn admin_list_introductions(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<IntroductionQuery>,
) -> AppResult<impl IntoResponse> {
    let introductions = IntroductionRepo::list(&state.pool, &params).await?;

    Ok(Json(DataResponse {
        data: introductions,
    }))
}

/// PATCH /api/v1/admin/introductions/{id}/status
///
/// Expire or cancel an open introduction. `placed` is reserved for the
/// attribution engine and cannot be set here; a placed introduction cannot
/// be transitioned at all. Setting the current status again is a no-op.
pub async fn update_introduction_status(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(introduction_id): Path<DbId>,
    Json(input): Json<UpdateIntroductionStatus>,
) -> AppResult<impl IntoResponse> {
    let target: IntroductionStatus = input.status.parse()?;

    if target == IntroductionStatus::Placed {
        return Err(AppError::Core(CoreError::Validation(
            "status 'placed' is set by placement creation, not directly".into(),
        )));
    }

    let current = IntroductionRepo::find_by_id(&state.pool, introduction_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Introduction",
            id: introduction_id,
        }))?;

    if current.status == target.as_str() {
        return Ok(Json(DataResponse { data: current }));
    }
    if current.status == IntroductionStatus::Placed.as_str() {
        return Err(AppError::Core(CoreError::InvalidState(format!(
            "introduction {introduction_id} is placed and cannot change status"
        ))));
    }

    let updated = IntroductionRepo::update_status(&state.pool, introduction_id, target)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Introduction",
            id: introduction_id,
        }))?;

    crate::audit::record(
        &state.pool,
        CreateAuditLog {
            entity_type: entity_types::INTRODUCTION,
            entity_id: Some(introduction_id),
            event_type: event_types::STATUS_CHANGED,
            old_value: Some(serde_json::json!({ "status": current.status })),
            new_value: Some(serde_json::json!({ "status": updated.status })),
            source: sources::ADMIN_API,
        },
    )
    .await;

    tracing::info!(
        introduction_id,
        from = %current.status,
        to = %updated.status,
        "Introduction status changed"
    );

    Ok(Json(DataResponse { data: updated }))
}

/// Reject obviously malformed submissions before touching the database.
fn validate_introduction(input: &CreateIntroduction) -> AppResult<()> {
    if input.crd_number <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "crd_number must be a positive integer".into(),
        )));
    }
    if input.conversation_ref.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "conversation_ref must not be empty".into(),
        )));
    }
    if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "first_name and last_name must not be empty".into(),
        )));
    }
    if input.introduced_at > chrono::Utc::now() {
        return Err(AppError::Core(CoreError::Validation(
            "introduced_at must not be in the future".into(),
        )));
    }
    Ok(())
}
