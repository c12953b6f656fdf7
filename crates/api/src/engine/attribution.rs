//! Attribution engine: greedy oldest-first matching of a hire against open
//! introductions, and atomic placement creation.
//!
//! The matching policy is fixed business logic: the earliest open
//! introduction for the candidate that passes the attribution window wins.
//! The engine never creates more than one placement per invocation, and the
//! open->placed transition plus the placement insert commit in a single
//! transaction, so a placement can never exist against a non-placed
//! introduction.

use rust_decimal::Decimal;
use serde_json::json;

use advlink_core::attribution::{resolve_fee, window_accepts, DEFAULT_WINDOW_MONTHS};
use advlink_core::audit::{entity_types, event_types, sources};
use advlink_core::error::CoreError;
use advlink_core::status::PlacementStatus;
use advlink_core::types::DbId;
use advlink_db::models::hire::Hire;
use advlink_db::models::introduction::Introduction;
use advlink_db::models::partner::{Partner, TermsSnapshot};
use advlink_db::models::placement::Placement;
use advlink_db::repositories::placement_repo::NewPlacement;
use advlink_db::repositories::{HireRepo, IntroductionRepo, PartnerRepo, PlacementRepo};
use advlink_events::{NotifyOutcome, PlacementSummary};

use crate::audit;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::state::AppState;

/// Default currency when neither the caller nor the partner specifies one.
const DEFAULT_CURRENCY: &str = "USD";

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Match a hire against the candidate's open introductions, oldest first.
///
/// Returns the created placement, or `None` when no open introduction is
/// within the attribution window -- a hire with no prior introduction is
/// simply not attributable, not an error.
///
/// Greedy single pass: the first introduction that passes the window check
/// wins and the scan stops. If placement creation then fails, the failure
/// propagates rather than falling through to a later introduction.
///
/// Safe to re-invoke for the same hire: once the matched introduction is
/// placed it is no longer open, so a second call finds nothing to match.
pub async fn match_hire_to_introductions(
    state: &AppState,
    hire_id: DbId,
) -> AppResult<Option<Placement>> {
    let hire = HireRepo::find_by_id(&state.pool, hire_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Hire",
            id: hire_id,
        }))?;

    let candidates =
        IntroductionRepo::find_open_for_candidate(&state.pool, hire.crd_number).await?;

    if candidates.is_empty() {
        tracing::debug!(
            hire_id,
            crd_number = hire.crd_number,
            "No open introductions for candidate; hire not attributable"
        );
        return Ok(None);
    }

    for introduction in &candidates {
        let partner = load_partner(state, introduction.partner_id).await?;
        let window = partner
            .attribution_window_months
            .unwrap_or(DEFAULT_WINDOW_MONTHS);

        if !window_accepts(introduction.introduced_at, hire.hire_date, window) {
            continue;
        }

        tracing::info!(
            hire_id,
            introduction_id = introduction.id,
            partner_id = partner.id,
            crd_number = hire.crd_number,
            "Hire matched to introduction"
        );

        let placement = create_placement(state, introduction.id, hire.id, None, None).await?;
        return Ok(Some(placement));
    }

    tracing::debug!(
        hire_id,
        crd_number = hire.crd_number,
        open_introductions = candidates.len(),
        "Open introductions exist but none within the attribution window"
    );
    Ok(None)
}

// ---------------------------------------------------------------------------
// Placement creation
// ---------------------------------------------------------------------------

/// Create a placement for an introduction/hire pair and transition the
/// introduction to `placed`, atomically.
///
/// Callable directly for manual/administrative placement, so every check is
/// re-validated here regardless of what the caller already verified:
///
/// - NotFound when either entity is missing;
/// - InvalidState unless the introduction is still open;
/// - Conflict when the CRD numbers differ or the hire falls outside the
///   partner's attribution window.
///
/// The winner of a racing create is decided by the optimistic status guard
/// on the introduction row; the loser observes the guard failure and aborts
/// without creating a duplicate.
pub async fn create_placement(
    state: &AppState,
    introduction_id: DbId,
    hire_id: DbId,
    fee_override: Option<Decimal>,
    fee_currency: Option<String>,
) -> AppResult<Placement> {
    let introduction = IntroductionRepo::find_by_id(&state.pool, introduction_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Introduction",
            id: introduction_id,
        }))?;

    let hire = HireRepo::find_by_id(&state.pool, hire_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Hire",
            id: hire_id,
        }))?;

    if introduction.status != "open" {
        return Err(AppError::Core(CoreError::InvalidState(format!(
            "Introduction {introduction_id} is {} (must be open to place)",
            introduction.status
        ))));
    }

    if introduction.crd_number != hire.crd_number {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "CRD mismatch: introduction has {}, hire has {}",
            introduction.crd_number, hire.crd_number
        ))));
    }

    let partner = load_partner(state, introduction.partner_id).await?;
    let window = partner
        .attribution_window_months
        .unwrap_or(DEFAULT_WINDOW_MONTHS);

    if !window_accepts(introduction.introduced_at, hire.hire_date, window) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Hire date {} is outside the {window}-month attribution window of introduction {}",
            hire.hire_date, introduction.id
        ))));
    }

    let fee_amount = resolve_fee(fee_override, partner.fee_flat, partner.fee_percent);
    let currency = fee_currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    let snapshot = TermsSnapshot::capture(&partner);

    let placement =
        persist_placement(state, &introduction, &hire, &partner, fee_amount, &currency, &snapshot)
            .await?;

    write_creation_audit(state, &introduction, &placement).await;

    // Notification happens outside the transaction: its outcome only decides
    // pending_notify vs notified, never the existence of the placement.
    let placement = dispatch_notification(state, &partner, &hire, placement).await;

    Ok(placement)
}

/// Run the guarded transition and the placement insert in one transaction.
async fn persist_placement(
    state: &AppState,
    introduction: &Introduction,
    hire: &Hire,
    partner: &Partner,
    fee_amount: Decimal,
    currency: &str,
    snapshot: &TermsSnapshot,
) -> AppResult<Placement> {
    let mut tx = state.pool.begin().await.map_err(AppError::Database)?;

    let placed = IntroductionRepo::mark_placed_if_open(&mut tx, introduction.id)
        .await
        .map_err(AppError::Database)?;

    if placed.is_none() {
        // Lost a race: the row left `open` between our read and this write.
        tx.rollback().await.ok();
        return Err(AppError::Core(CoreError::InvalidState(format!(
            "Introduction {} is no longer open",
            introduction.id
        ))));
    }

    let new = NewPlacement {
        partner_id: partner.id,
        introduction_id: introduction.id,
        hire_id: hire.id,
        crd_number: hire.crd_number,
        hire_date: hire.hire_date,
        fee_amount,
        fee_currency: currency,
        terms_snapshot: serde_json::to_value(snapshot)
            .map_err(|e| AppError::InternalError(format!("Terms snapshot serialization: {e}")))?,
    };

    let placement = match PlacementRepo::insert(&mut tx, &new).await {
        Ok(placement) => placement,
        Err(e) => {
            tx.rollback().await.ok();
            if is_unique_violation(&e, "uq_placements_introduction") {
                return Err(AppError::Core(CoreError::Conflict(format!(
                    "Introduction {} already has a placement",
                    introduction.id
                ))));
            }
            return Err(AppError::Database(e));
        }
    };

    tx.commit().await.map_err(AppError::Database)?;
    Ok(placement)
}

/// Audit both halves of the transition (fire-and-forget).
async fn write_creation_audit(state: &AppState, introduction: &Introduction, placement: &Placement) {
    audit::record(
        &state.pool,
        advlink_db::models::audit::CreateAuditLog {
            entity_type: entity_types::PLACEMENT,
            entity_id: Some(placement.id),
            event_type: event_types::CREATED,
            old_value: None,
            new_value: serde_json::to_value(placement).ok(),
            source: sources::ATTRIBUTION_ENGINE,
        },
    )
    .await;

    audit::record(
        &state.pool,
        advlink_db::models::audit::CreateAuditLog {
            entity_type: entity_types::INTRODUCTION,
            entity_id: Some(introduction.id),
            event_type: event_types::STATUS_CHANGED,
            old_value: Some(json!({ "status": "open" })),
            new_value: Some(json!({ "status": "placed" })),
            source: sources::ATTRIBUTION_ENGINE,
        },
    )
    .await;
}

/// Attempt partner notification and advance the placement status on success.
///
/// A partner without a configured endpoint counts as notified (they opted
/// out of push delivery). On failure the placement stays `pending_notify`
/// for the retry sweep.
async fn dispatch_notification(
    state: &AppState,
    partner: &Partner,
    hire: &Hire,
    placement: Placement,
) -> Placement {
    let summary = PlacementSummary {
        placement_id: placement.id,
        introduction_id: placement.introduction_id,
        crd_number: placement.crd_number,
        advisor_name: hire.advisor_name.clone(),
        hire_date: placement.hire_date,
        fee_amount: placement.fee_amount,
        fee_currency: placement.fee_currency.clone(),
        created_at: placement.created_at,
    };

    let outcome = state
        .notifier
        .notify(
            partner.notify_url.as_deref(),
            partner.notify_secret.as_deref(),
            &summary,
        )
        .await;

    match outcome {
        Ok(NotifyOutcome::Delivered) | Ok(NotifyOutcome::Skipped) => {
            match PlacementRepo::update_status(&state.pool, placement.id, PlacementStatus::Notified)
                .await
            {
                Ok(Some(updated)) => updated,
                Ok(None) => placement,
                Err(e) => {
                    tracing::warn!(
                        placement_id = placement.id,
                        error = %e,
                        "Failed to advance placement to notified; stays pending_notify"
                    );
                    placement
                }
            }
        }
        Err(e) => {
            tracing::warn!(
                placement_id = placement.id,
                partner_id = partner.id,
                error = %e,
                "Partner notification failed; placement stays pending_notify"
            );
            placement
        }
    }
}

/// Load the partner owning an introduction. A missing partner row is a
/// referential-integrity breach, not a caller error.
async fn load_partner(state: &AppState, partner_id: DbId) -> AppResult<Partner> {
    PartnerRepo::find_by_id(&state.pool, partner_id)
        .await?
        .ok_or_else(|| {
            AppError::InternalError(format!(
                "Introduction references missing partner {partner_id}"
            ))
        })
}
