//! Authentication extractors for Axum handlers.
//!
//! Two callers, two schemes:
//! - partners present their opaque API secret in `X-Api-Key`; we hash it and
//!   look the partner up by hash (the plaintext is never stored);
//! - administrative endpoints require the static `ADMIN_TOKEN` as a Bearer
//!   token.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use advlink_core::error::CoreError;
use advlink_core::secrets::hash_secret;
use advlink_db::models::partner::Partner;
use advlink_db::repositories::PartnerRepo;

use crate::error::AppError;
use crate::router::API_KEY_HEADER;
use crate::state::AppState;

/// Authenticated partner extracted from the `X-Api-Key` header.
///
/// Use as an extractor parameter in any partner-facing handler:
///
/// ```ignore
/// async fn my_handler(AuthPartner(partner): AuthPartner) -> AppResult<Json<()>> {
///     tracing::info!(partner_id = partner.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
///
/// Disabled partners (`is_active = false`) do not authenticate.
#[derive(Debug, Clone)]
pub struct AuthPartner(pub Partner);

impl FromRequestParts<AppState> for AuthPartner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let secret = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Missing X-Api-Key header".into()))
            })?;

        let partner = PartnerRepo::find_by_secret_hash(&state.pool, &hash_secret(secret))
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Invalid API secret".into()))
            })?;

        Ok(AuthPartner(partner))
    }
}

/// Administrative access via the static `ADMIN_TOKEN` Bearer token.
///
/// When `ADMIN_TOKEN` is unset, every admin request is rejected -- there is
/// no default credential.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let expected = state.config.admin_token.as_deref().ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "Administrative access is not configured".into(),
            ))
        })?;

        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        // Compare hashes so the comparison length does not depend on how
        // much of the token matches.
        if hash_secret(token) != hash_secret(expected) {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid admin token".into(),
            )));
        }

        Ok(RequireAdmin)
    }
}
