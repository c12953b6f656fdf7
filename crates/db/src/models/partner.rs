//! Partner (recruiting vendor) entity models and DTOs.
//!
//! Partners are soft-disabled via `is_active`, never deleted, so historical
//! introductions and placements keep valid references. The secret hash and
//! notification signing secret are never serialized into API responses.

use advlink_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Partner entity
// ---------------------------------------------------------------------------

/// A recruiting partner: supplies introductions, receives placement
/// notifications and fees.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Partner {
    pub id: DbId,
    pub name: String,
    /// Flat fee per placement, if the partner is on flat terms.
    pub fee_flat: Option<Decimal>,
    /// Fee percentage, if the partner is on percentage terms.
    pub fee_percent: Option<Decimal>,
    /// Attribution window in months; `None` means the system default (12).
    pub attribution_window_months: Option<i32>,
    pub notify_url: Option<String>,
    #[serde(skip_serializing)]
    pub notify_secret: Option<String>,
    #[serde(skip_serializing)]
    pub secret_hash: String,
    /// First characters of the API secret, safe to display.
    pub secret_prefix: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for creating a partner. The API secret is generated server-side,
/// not supplied by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePartner {
    pub name: String,
    pub fee_flat: Option<Decimal>,
    pub fee_percent: Option<Decimal>,
    pub attribution_window_months: Option<i32>,
    pub notify_url: Option<String>,
    pub notify_secret: Option<String>,
}

/// DTO for updating a partner's terms and notification endpoint.
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePartner {
    pub name: Option<String>,
    pub fee_flat: Option<Decimal>,
    pub fee_percent: Option<Decimal>,
    pub attribution_window_months: Option<i32>,
    pub notify_url: Option<String>,
    pub notify_secret: Option<String>,
}

/// Response for partner creation and secret rotation: the one time the
/// plaintext secret leaves the system.
#[derive(Debug, Serialize)]
pub struct PartnerWithSecret {
    #[serde(flatten)]
    pub partner: Partner,
    pub api_secret: String,
}

// ---------------------------------------------------------------------------
// Terms snapshot
// ---------------------------------------------------------------------------

/// The partner attribution terms frozen onto a placement at creation time,
/// so later term changes never retroactively alter historical fee logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermsSnapshot {
    pub fee_flat: Option<Decimal>,
    pub fee_percent: Option<Decimal>,
    pub attribution_window_months: i32,
}

impl TermsSnapshot {
    /// Capture the partner's current terms, resolving the window default.
    pub fn capture(partner: &Partner) -> Self {
        Self {
            fee_flat: partner.fee_flat,
            fee_percent: partner.fee_percent,
            attribution_window_months: partner
                .attribution_window_months
                .unwrap_or(advlink_core::attribution::DEFAULT_WINDOW_MONTHS),
        }
    }
}
