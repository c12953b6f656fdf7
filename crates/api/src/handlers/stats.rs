//! Summary statistics for operators.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

use advlink_db::models::placement::SummaryStats;
use advlink_db::repositories::hire_repo::HireRepo;
use advlink_db::repositories::introduction_repo::IntroductionRepo;
use advlink_db::repositories::placement_repo::PlacementRepo;

use crate::error::AppResult;
use crate::middleware::auth::RequireAdmin;
use crate::query::TimeRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/stats/summary
///
/// Ledger totals plus placement counts and fee sums grouped by partner and
/// status. The optional time range bounds the placement aggregation only;
/// totals are always ledger-wide.
pub async fn get_summary(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(range): Query<TimeRangeParams>,
) -> AppResult<impl IntoResponse> {
    let open_introductions = IntroductionRepo::count_open(&state.pool).await?;
    let total_hires = HireRepo::count_all(&state.pool).await?;
    let total_placements = PlacementRepo::count_all(&state.pool).await?;
    let by_partner_status =
        PlacementRepo::summary_by_partner_status(&state.pool, range.from, range.to).await?;

    Ok(Json(DataResponse {
        data: SummaryStats {
            open_introductions,
            total_hires,
            total_placements,
            by_partner_status,
        },
    }))
}
