//! Pure attribution arithmetic: window checks and fee resolution.
//!
//! The attribution engine in the API crate drives the matching loop; the
//! arithmetic lives here so it can be unit-tested without a database.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::types::Timestamp;

/// System-wide attribution window applied when a partner has no configured
/// window of its own.
pub const DEFAULT_WINDOW_MONTHS: i32 = 12;

// ---------------------------------------------------------------------------
// Window check
// ---------------------------------------------------------------------------

/// Calendar-month difference between an introduction timestamp and a hire
/// date: `(hire_year - intro_year) * 12 + (hire_month - intro_month)`.
///
/// This is a coarse calendar-month subtraction, not an elapsed-day count:
/// a hire on the 1st and a hire on the 28th of the same month both count
/// as the same difference. This is the documented ledger semantic, kept
/// deliberately.
pub fn months_between(intro_at: Timestamp, hire_date: NaiveDate) -> i32 {
    (hire_date.year() - intro_at.year()) * 12
        + (hire_date.month() as i32 - intro_at.month() as i32)
}

/// Whether a hire on `hire_date` is attributable to an introduction made at
/// `intro_at` under a window of `window_months`.
///
/// Two conditions, both required:
/// - the calendar-month difference is within the window (inclusive), and
/// - the hire does not precede the introduction (guards against clock skew
///   and reordered external data).
pub fn window_accepts(intro_at: Timestamp, hire_date: NaiveDate, window_months: i32) -> bool {
    months_between(intro_at, hire_date) <= window_months && hire_date >= intro_at.date_naive()
}

// ---------------------------------------------------------------------------
// Fee resolution
// ---------------------------------------------------------------------------

/// Resolve the fee amount for a new placement.
///
/// Resolution order: explicit caller override, then the partner's flat fee,
/// then the partner's fee percentage, then zero.
///
/// The percentage branch resolves to zero: no salary data is available at
/// match time, so a percentage-based partner produces a zero-fee placement
/// that is expected to be corrected manually afterwards. Preserved as
/// documented behaviour.
pub fn resolve_fee(
    fee_override: Option<Decimal>,
    partner_flat: Option<Decimal>,
    partner_percent: Option<Decimal>,
) -> Decimal {
    if let Some(fee) = fee_override {
        return fee;
    }
    if let Some(flat) = partner_flat {
        return flat;
    }
    if partner_percent.is_some() {
        return Decimal::ZERO;
    }
    Decimal::ZERO
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
