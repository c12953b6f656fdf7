//! Audit log query handler (admin only).

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

use advlink_db::models::audit::AuditQuery;
use advlink_db::repositories::audit_repo::AuditRepo;

use crate::error::AppResult;
use crate::middleware::auth::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/audit
///
/// Query the append-only audit trail, newest first, filtered by entity,
/// event type, and time range.
pub async fn query_audit(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AuditQuery>,
) -> AppResult<impl IntoResponse> {
    let entries = AuditRepo::query(&state.pool, &params).await?;

    Ok(Json(DataResponse { data: entries }))
}
