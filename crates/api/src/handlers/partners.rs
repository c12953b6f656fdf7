//! Handlers for partner administration.
//!
//! Partners are managed exclusively through the admin API. The plaintext
//! API secret appears in exactly two responses, creation and rotation, and
//! is never readable again afterwards.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use advlink_core::audit::{entity_types, event_types, sources};
use advlink_core::error::CoreError;
use advlink_core::secrets;
use advlink_core::types::DbId;
use advlink_db::models::audit::CreateAuditLog;
use advlink_db::models::partner::{CreatePartner, PartnerWithSecret, UpdatePartner};
use advlink_db::repositories::partner_repo::PartnerRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/partners
///
/// Create a partner and generate its API secret. The plaintext secret is
/// returned once in this response; only its hash is stored.
pub async fn create_partner(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreatePartner>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    validate_fee_terms(input.fee_flat, input.fee_percent)?;

    let secret = secrets::generate_secret();
    let partner = PartnerRepo::create(&state.pool, &input, &secret.hash, &secret.prefix).await?;

    crate::audit::record(
        &state.pool,
        CreateAuditLog {
            entity_type: entity_types::PARTNER,
            entity_id: Some(partner.id),
            event_type: event_types::CREATED,
            old_value: None,
            new_value: serde_json::to_value(&partner).ok(),
            source: sources::ADMIN_API,
        },
    )
    .await;

    tracing::info!(partner_id = partner.id, name = %partner.name, "Partner created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: PartnerWithSecret {
                partner,
                api_secret: secret.plaintext,
            },
        }),
    ))
}

/// GET /api/v1/partners
pub async fn list_partners(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let partners = PartnerRepo::list(&state.pool).await?;

    Ok(Json(DataResponse { data: partners }))
}

/// GET /api/v1/partners/{id}
pub async fn get_partner(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(partner_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let partner = PartnerRepo::find_by_id(&state.pool, partner_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Partner",
            id: partner_id,
        }))?;

    Ok(Json(DataResponse { data: partner }))
}

/// PUT /api/v1/partners/{id}
///
/// Update a partner's terms and notification endpoint. Existing placements
/// are unaffected; they carry the terms snapshot captured at creation.
pub async fn update_partner(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(partner_id): Path<DbId>,
    Json(input): Json<UpdatePartner>,
) -> AppResult<impl IntoResponse> {
    let before = PartnerRepo::find_by_id(&state.pool, partner_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Partner",
            id: partner_id,
        }))?;

    validate_fee_terms(input.fee_flat, input.fee_percent)?;

    let partner = PartnerRepo::update(&state.pool, partner_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Partner",
            id: partner_id,
        }))?;

    crate::audit::record(
        &state.pool,
        CreateAuditLog {
            entity_type: entity_types::PARTNER,
            entity_id: Some(partner.id),
            event_type: event_types::TERMS_UPDATED,
            old_value: serde_json::to_value(&before).ok(),
            new_value: serde_json::to_value(&partner).ok(),
            source: sources::ADMIN_API,
        },
    )
    .await;

    tracing::info!(partner_id, "Partner updated");

    Ok(Json(DataResponse { data: partner }))
}

/// POST /api/v1/partners/{id}/rotate-secret
///
/// Generate a fresh API secret, invalidating the old one immediately.
pub async fn rotate_secret(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(partner_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let secret = secrets::generate_secret();

    let partner = PartnerRepo::rotate_secret(&state.pool, partner_id, &secret.hash, &secret.prefix)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Partner",
            id: partner_id,
        }))?;

    crate::audit::record(
        &state.pool,
        CreateAuditLog {
            entity_type: entity_types::PARTNER,
            entity_id: Some(partner.id),
            event_type: event_types::SECRET_ROTATED,
            old_value: None,
            new_value: Some(serde_json::json!({ "secret_prefix": partner.secret_prefix })),
            source: sources::ADMIN_API,
        },
    )
    .await;

    tracing::info!(partner_id, "Partner API secret rotated");

    Ok(Json(DataResponse {
        data: PartnerWithSecret {
            partner,
            api_secret: secret.plaintext,
        },
    }))
}

/// Request body for activating/deactivating a partner.
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// PUT /api/v1/partners/{id}/active
///
/// Soft enable/disable. Deactivated partners fail authentication but keep
/// their historical rows.
pub async fn set_active(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(partner_id): Path<DbId>,
    Json(input): Json<SetActiveRequest>,
) -> AppResult<impl IntoResponse> {
    let partner = PartnerRepo::set_active(&state.pool, partner_id, input.is_active)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Partner",
            id: partner_id,
        }))?;

    crate::audit::record(
        &state.pool,
        CreateAuditLog {
            entity_type: entity_types::PARTNER,
            entity_id: Some(partner.id),
            event_type: event_types::STATUS_CHANGED,
            old_value: Some(serde_json::json!({ "is_active": !input.is_active })),
            new_value: Some(serde_json::json!({ "is_active": input.is_active })),
            source: sources::ADMIN_API,
        },
    )
    .await;

    tracing::info!(partner_id, is_active = input.is_active, "Partner active flag changed");

    Ok(Json(DataResponse { data: partner }))
}

/// Fee terms must be non-negative. Flat terms take precedence over
/// percentage terms at resolution time; both may be configured.
fn validate_fee_terms(
    fee_flat: Option<rust_decimal::Decimal>,
    fee_percent: Option<rust_decimal::Decimal>,
) -> AppResult<()> {
    if fee_flat.is_some_and(|f| f.is_sign_negative()) {
        return Err(AppError::Core(CoreError::Validation(
            "fee_flat must not be negative".into(),
        )));
    }
    if fee_percent.is_some_and(|p| p.is_sign_negative()) {
        return Err(AppError::Core(CoreError::Validation(
            "fee_percent must not be negative".into(),
        )));
    }
    Ok(())
}
