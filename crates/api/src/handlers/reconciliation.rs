//! Handlers for the reconciliation admin surface.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::background::reconciliation::RunOutcome;
use crate::error::AppResult;
use crate::middleware::auth::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/reconciliation/run
///
/// Trigger a reconciliation run immediately. The run shares the lock and
/// circuit breaker with the scheduler, so a concurrent scheduled run or an
/// open breaker yields a skip outcome rather than a second run.
pub async fn trigger_run(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    tracing::info!("Reconciliation run triggered manually");

    let outcome = state.reconciliation.run_once(&state).await;

    if let RunOutcome::Failed { error } = &outcome {
        tracing::error!(error = %error, "Manually triggered reconciliation run failed");
    }

    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/reconciliation/status
///
/// Breaker state, failure counter, and the last run's summary.
pub async fn get_status(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let status = state.reconciliation.status().await;

    Ok(Json(DataResponse { data: status }))
}

/// POST /api/v1/reconciliation/breaker/reset
///
/// Clear the consecutive-failure counter so the scheduler resumes calling
/// the registry. For operators, after the upstream outage is resolved.
pub async fn reset_breaker(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    state.reconciliation.reset_breaker();

    tracing::info!("Reconciliation circuit breaker reset");

    let status = state.reconciliation.status().await;

    Ok(Json(DataResponse { data: status }))
}
