//! Placement entity models and DTOs.
//!
//! A placement is the billable record joining exactly one introduction to a
//! hire. The `uq_placements_introduction` constraint guarantees at most one
//! placement per introduction, even under racing match attempts.

use advlink_core::types::{CrdNumber, DbId, Timestamp};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Placement entity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Placement {
    pub id: DbId,
    pub partner_id: DbId,
    pub introduction_id: DbId,
    pub hire_id: DbId,
    pub crd_number: CrdNumber,
    pub hire_date: NaiveDate,
    pub status: String,
    pub fee_amount: Decimal,
    pub fee_currency: String,
    /// Partner terms frozen at creation time.
    pub terms_snapshot: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for manual/administrative placement creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlacement {
    pub introduction_id: DbId,
    pub hire_id: DbId,
    pub fee_override: Option<Decimal>,
    pub fee_currency: Option<String>,
}

/// DTO for administrative placement status advancement
/// (invoiced / paid / disputed).
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePlacementStatus {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filter parameters for listing placements.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlacementQuery {
    pub partner_id: Option<DbId>,
    pub crd_number: Option<CrdNumber>,
    pub status: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// One row of the status/partner summary aggregation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlacementStatusCount {
    pub partner_id: DbId,
    pub partner_name: String,
    pub status: String,
    pub count: i64,
    pub total_fees: Decimal,
}

/// Aggregate counts for the summary-statistics endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub open_introductions: i64,
    pub total_hires: i64,
    pub total_placements: i64,
    pub by_partner_status: Vec<PlacementStatusCount>,
}
