//! Introduction entity models and DTOs.
//!
//! An introduction is a double-opt-in event recorded by a partner. The
//! `(partner_id, crd_number, conversation_ref)` triple is the idempotency
//! key: repeat submissions return the existing row unchanged.

use advlink_core::types::{CrdNumber, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Introduction entity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Introduction {
    pub id: DbId,
    pub partner_id: DbId,
    pub crd_number: CrdNumber,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// When the candidate opted in -- supplied by the partner, not server time.
    pub introduced_at: Timestamp,
    pub conversation_ref: String,
    pub status: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for a partner-submitted introduction.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIntroduction {
    pub crd_number: CrdNumber,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub introduced_at: Timestamp,
    pub conversation_ref: String,
    pub metadata: Option<serde_json::Value>,
}

/// DTO for an administrative status update (expire / cancel).
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateIntroductionStatus {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filter parameters for listing introductions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntroductionQuery {
    pub partner_id: Option<DbId>,
    pub crd_number: Option<CrdNumber>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Create result
// ---------------------------------------------------------------------------

/// Result of an idempotent introduction create: the row plus whether this
/// call actually inserted it. Side effects (audit entry, notification) only
/// fire when `created` is true.
#[derive(Debug, Clone)]
pub struct IntroductionCreateResult {
    pub introduction: Introduction,
    pub created: bool,
}
