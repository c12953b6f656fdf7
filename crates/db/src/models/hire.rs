//! Hire entity models and DTOs.
//!
//! Hires arrive from internal onboarding, the registry reconciliation job,
//! or manual entry; all three funnel through the same create operation,
//! idempotent on `(crd_number, firm_name, hire_date)`.

use advlink_core::types::{CrdNumber, DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Hire entity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Hire {
    pub id: DbId,
    pub crd_number: CrdNumber,
    pub advisor_name: String,
    pub firm_name: String,
    /// CRD of the hiring firm; absent for internally-sourced hires.
    pub firm_crd: Option<CrdNumber>,
    pub hire_date: NaiveDate,
    pub termination_date: Option<NaiveDate>,
    pub source: String,
    /// Raw upstream reference for traceability (e.g. registry record id).
    pub source_ref: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for creating a hire. The source tag is supplied by the calling code
/// path, not the request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateHire {
    pub crd_number: CrdNumber,
    pub advisor_name: String,
    pub firm_name: String,
    pub firm_crd: Option<CrdNumber>,
    pub hire_date: NaiveDate,
    pub source_ref: Option<String>,
}

/// DTO for recording a termination date.
#[derive(Debug, Clone, Deserialize)]
pub struct SetTermination {
    pub termination_date: NaiveDate,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filter parameters for listing hires.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HireQuery {
    pub crd_number: Option<CrdNumber>,
    pub source: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Create result
// ---------------------------------------------------------------------------

/// Result of an idempotent hire create. Attribution is only triggered by
/// callers when `created` is true.
#[derive(Debug, Clone)]
pub struct HireCreateResult {
    pub hire: Hire,
    pub created: bool,
}
