//! Registry reconciliation: periodically sweep open introductions and ask
//! the advisor registry whether any candidate now works at the firm.
//!
//! One run walks the distinct CRD numbers with at least one open
//! introduction, looks each up against the registry (rate-limited,
//! sequential), records a hire for every confirmed affiliation, and feeds
//! genuinely new hires through the attribution engine. Runs are serialized
//! by an async lock, so the scheduler tick and the manual trigger endpoint
//! never overlap.
//!
//! A circuit breaker guards the registry: after
//! [`FAILURE_THRESHOLD`] consecutive failed runs, subsequent runs are
//! skipped (zero external calls) until an operator resets the counter.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use advlink_core::audit::{entity_types, event_types, sources};
use advlink_core::status::HireSource;
use advlink_core::types::CrdNumber;
use advlink_db::models::audit::CreateAuditLog;
use advlink_db::models::hire::CreateHire;
use advlink_db::repositories::hire_repo::HireRepo;
use advlink_db::repositories::introduction_repo::IntroductionRepo;
use advlink_registry::AdvisorLookup;

use crate::engine::attribution;
use crate::state::AppState;

/// Consecutive failed runs before the circuit breaker opens.
pub const FAILURE_THRESHOLD: u32 = 5;

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

/// Counters and errors from a completed reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: advlink_core::types::Timestamp,
    pub finished_at: advlink_core::types::Timestamp,
    /// Distinct CRD numbers with open introductions that were checked.
    pub candidates_checked: u64,
    /// Candidates the registry confirmed as affiliated with the firm.
    pub hires_found: u64,
    /// Hires that did not already exist in the ledger.
    pub hires_created: u64,
    /// Placements created by attribution for the new hires.
    pub placements_created: u64,
    /// Per-candidate errors. These do not fail the run.
    pub errors: Vec<String>,
}

/// Outcome of a single run attempt, returned by [`ReconciliationService::run_once`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed(RunSummary),
    /// Registry client or firm CRD not configured; nothing to do.
    SkippedUnconfigured,
    /// Circuit breaker is open after repeated failed runs.
    SkippedBreakerOpen,
    /// Another run (scheduled or manual) is already in progress.
    SkippedAlreadyRunning,
    /// The run could not obtain its candidate list. Counts toward the
    /// circuit breaker.
    Failed { error: String },
}

/// Snapshot for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationStatus {
    pub configured: bool,
    pub consecutive_failures: u32,
    pub breaker_open: bool,
    pub last_run: Option<RunSummary>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Shared reconciliation state: the registry client, failure counter and
/// last-run summary. Lives in [`AppState`] so the status and trigger
/// endpoints see the same counters as the scheduler.
pub struct ReconciliationService {
    lookup: Option<Arc<dyn AdvisorLookup>>,
    firm_crd: Option<CrdNumber>,
    lookup_delay: Duration,
    consecutive_failures: AtomicU32,
    last_run: Mutex<Option<RunSummary>>,
    run_lock: Mutex<()>,
}

impl ReconciliationService {
    pub fn new(
        lookup: Option<Arc<dyn AdvisorLookup>>,
        firm_crd: Option<CrdNumber>,
        lookup_delay: Duration,
    ) -> Self {
        Self {
            lookup,
            firm_crd,
            lookup_delay,
            consecutive_failures: AtomicU32::new(0),
            last_run: Mutex::new(None),
            run_lock: Mutex::new(()),
        }
    }

    /// Whether both the registry client and the firm CRD are configured.
    pub fn is_configured(&self) -> bool {
        self.lookup.is_some() && self.firm_crd.is_some()
    }

    /// Reset the circuit breaker. Exposed to operators via the admin API.
    pub fn reset_breaker(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
    }

    /// Current status snapshot for the admin API.
    pub async fn status(&self) -> ReconciliationStatus {
        let failures = self.consecutive_failures.load(Ordering::SeqCst);
        ReconciliationStatus {
            configured: self.is_configured(),
            consecutive_failures: failures,
            breaker_open: failures >= FAILURE_THRESHOLD,
            last_run: self.last_run.lock().await.clone(),
        }
    }

    /// Attempt one reconciliation run.
    ///
    /// Skips (without touching the registry) when unconfigured, when the
    /// breaker is open, or when a run is already in progress. The failure
    /// counter increments when the candidate list cannot be fetched or when
    /// every candidate check errors; a completed run resets it. Partial
    /// per-candidate errors are collected into the summary and do not fail
    /// the run.
    pub async fn run_once(&self, state: &AppState) -> RunOutcome {
        let (lookup, firm_crd) = match (&self.lookup, self.firm_crd) {
            (Some(lookup), Some(firm_crd)) => (Arc::clone(lookup), firm_crd),
            _ => {
                warn!("Reconciliation skipped: registry client or FIRM_CRD not configured");
                return RunOutcome::SkippedUnconfigured;
            }
        };

        let _guard = match self.run_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                info!("Reconciliation skipped: a run is already in progress");
                return RunOutcome::SkippedAlreadyRunning;
            }
        };

        let failures = self.consecutive_failures.load(Ordering::SeqCst);
        if failures >= FAILURE_THRESHOLD {
            error!(
                consecutive_failures = failures,
                "Reconciliation circuit breaker is open; run skipped"
            );
            self.record_skip_audit(state, failures).await;
            return RunOutcome::SkippedBreakerOpen;
        }

        let started_at = Utc::now();

        let candidates = match IntroductionRepo::distinct_open_crds(&state.pool).await {
            Ok(crds) => crds,
            Err(err) => {
                let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
                error!(
                    error = %err,
                    consecutive_failures = failures,
                    "Reconciliation run failed to list open candidates"
                );
                return RunOutcome::Failed {
                    error: err.to_string(),
                };
            }
        };

        let mut summary = RunSummary {
            started_at,
            finished_at: started_at,
            candidates_checked: 0,
            hires_found: 0,
            hires_created: 0,
            placements_created: 0,
            errors: Vec::new(),
        };

        let mut failed_candidates = 0u64;
        for (idx, crd) in candidates.iter().copied().enumerate() {
            if idx > 0 {
                tokio::time::sleep(self.lookup_delay).await;
            }
            summary.candidates_checked += 1;

            if let Err(err) = self
                .check_candidate(state, lookup.as_ref(), firm_crd, crd, &mut summary)
                .await
            {
                warn!(crd_number = crd, error = %err, "Reconciliation candidate check failed");
                summary.errors.push(format!("crd {crd}: {err}"));
                failed_candidates += 1;
            }
        }

        summary.finished_at = Utc::now();
        *self.last_run.lock().await = Some(summary.clone());

        // Every single candidate failing means the registry (or the database
        // behind it) is down, not that individual records are bad. That is a
        // failed run for breaker purposes.
        if summary.candidates_checked > 0 && failed_candidates == summary.candidates_checked {
            let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
            error!(
                candidates_checked = summary.candidates_checked,
                consecutive_failures = failures,
                "Reconciliation run failed for every candidate"
            );
            return RunOutcome::Failed {
                error: format!(
                    "all {} candidate checks failed",
                    summary.candidates_checked
                ),
            };
        }

        self.consecutive_failures.store(0, Ordering::SeqCst);

        info!(
            candidates_checked = summary.candidates_checked,
            hires_found = summary.hires_found,
            hires_created = summary.hires_created,
            placements_created = summary.placements_created,
            errors = summary.errors.len(),
            "Reconciliation run completed"
        );
        self.record_run_audit(state, &summary).await;

        RunOutcome::Completed(summary)
    }

    /// Look one candidate up and, on a confirmed affiliation, record the
    /// hire and attribute it.
    async fn check_candidate(
        &self,
        state: &AppState,
        lookup: &dyn AdvisorLookup,
        firm_crd: CrdNumber,
        crd: CrdNumber,
        summary: &mut RunSummary,
    ) -> anyhow::Result<()> {
        let Some(record) = lookup.lookup(crd, firm_crd).await? else {
            return Ok(());
        };
        summary.hires_found += 1;

        let hire_date = record
            .registered_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .unwrap_or_else(|| Utc::now().date_naive());

        let input = CreateHire {
            crd_number: record.crd_number,
            advisor_name: record.name.clone(),
            firm_name: record.firm_name.clone(),
            firm_crd: Some(record.firm_crd),
            hire_date,
            source_ref: record.record_ref.clone(),
        };

        let result = HireRepo::create(&state.pool, &input, HireSource::RegistrySync).await?;
        if !result.created {
            return Ok(());
        }
        summary.hires_created += 1;

        match attribution::match_hire_to_introductions(state, result.hire.id).await {
            Ok(Some(placement)) => {
                summary.placements_created += 1;
                info!(
                    hire_id = result.hire.id,
                    placement_id = placement.id,
                    "Reconciliation attributed a new hire"
                );
            }
            Ok(None) => {}
            Err(err) => {
                summary
                    .errors
                    .push(format!("crd {crd}: attribution failed: {err}"));
            }
        }
        Ok(())
    }

    async fn record_run_audit(&self, state: &AppState, summary: &RunSummary) {
        let new_value = serde_json::to_value(summary).ok();
        crate::audit::record(
            &state.pool,
            CreateAuditLog {
                entity_type: entity_types::RECONCILIATION,
                entity_id: None,
                event_type: event_types::RUN_COMPLETED,
                old_value: None,
                new_value,
                source: sources::RECONCILIATION,
            },
        )
        .await;
    }

    async fn record_skip_audit(&self, state: &AppState, failures: u32) {
        crate::audit::record(
            &state.pool,
            CreateAuditLog {
                entity_type: entity_types::RECONCILIATION,
                entity_id: None,
                event_type: event_types::RUN_SKIPPED,
                old_value: None,
                new_value: Some(serde_json::json!({
                    "reason": "circuit_breaker_open",
                    "consecutive_failures": failures,
                })),
                source: sources::RECONCILIATION,
            },
        )
        .await;
    }
}

// ---------------------------------------------------------------------------
// Scheduler loop
// ---------------------------------------------------------------------------

/// Periodic reconciliation loop. Spawned from `main`; exits when the
/// cancellation token fires. The first tick is consumed immediately so the
/// initial run happens one full interval after startup.
pub async fn run_scheduler(state: AppState, interval: Duration, cancel: CancellationToken) {
    info!(interval_secs = interval.as_secs(), "Reconciliation scheduler started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Reconciliation scheduler shutting down");
                break;
            }
            _ = ticker.tick() => {
                let outcome = state.reconciliation.run_once(&state).await;
                if let RunOutcome::Completed(summary) = &outcome {
                    if !summary.errors.is_empty() {
                        warn!(
                            errors = summary.errors.len(),
                            "Reconciliation run completed with candidate errors"
                        );
                    }
                }
            }
        }
    }
}
