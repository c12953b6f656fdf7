//! Repository for the `introductions` table.
//!
//! Owns the idempotent create (unique partner/CRD/conversation triple) and
//! the optimistic status guard the attribution engine relies on.

use sqlx::PgPool;

use advlink_core::status::IntroductionStatus;
use advlink_core::types::{CrdNumber, DbId};

use crate::models::introduction::{
    CreateIntroduction, Introduction, IntroductionCreateResult, IntroductionQuery,
};

/// Column list for `introductions` SELECT queries.
const COLUMNS: &str = "\
    id, partner_id, crd_number, first_name, last_name, email, phone, \
    introduced_at, conversation_ref, status, metadata, created_at, updated_at";

/// Provides CRUD and matching-scan operations for introductions.
pub struct IntroductionRepo;

impl IntroductionRepo {
    /// Idempotent create keyed on `(partner_id, crd_number, conversation_ref)`.
    ///
    /// Inserts with `ON CONFLICT DO NOTHING`; when the triple already exists
    /// the existing row is returned unchanged and `created` is false, so the
    /// caller can skip audit/notification side effects. A constraint
    /// violation never surfaces to the caller.
    pub async fn create(
        pool: &PgPool,
        partner_id: DbId,
        input: &CreateIntroduction,
    ) -> Result<IntroductionCreateResult, sqlx::Error> {
        let query = format!(
            "INSERT INTO introductions \
                (partner_id, crd_number, first_name, last_name, email, phone, \
                 introduced_at, conversation_ref, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT ON CONSTRAINT uq_introductions_partner_crd_ref DO NOTHING \
             RETURNING {COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, Introduction>(&query)
            .bind(partner_id)
            .bind(input.crd_number)
            .bind(input.first_name.trim())
            .bind(input.last_name.trim())
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.introduced_at)
            .bind(input.conversation_ref.trim())
            .bind(&input.metadata)
            .fetch_optional(pool)
            .await?;

        if let Some(introduction) = inserted {
            return Ok(IntroductionCreateResult {
                introduction,
                created: true,
            });
        }

        // The triple already exists: return the prior row unchanged.
        let query = format!(
            "SELECT {COLUMNS} FROM introductions \
             WHERE partner_id = $1 AND crd_number = $2 AND conversation_ref = $3"
        );
        let existing = sqlx::query_as::<_, Introduction>(&query)
            .bind(partner_id)
            .bind(input.crd_number)
            .bind(input.conversation_ref.trim())
            .fetch_one(pool)
            .await?;

        Ok(IntroductionCreateResult {
            introduction: existing,
            created: false,
        })
    }

    /// Find an introduction by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Introduction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM introductions WHERE id = $1");
        sqlx::query_as::<_, Introduction>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All OPEN introductions for a candidate, oldest first.
    ///
    /// The ordering is a correctness requirement, not an optimization: it
    /// decides which partner wins attribution when several introductions are
    /// open for the same candidate. `id` is a tiebreak so the ordering is
    /// total even for identical timestamps.
    pub async fn find_open_for_candidate(
        pool: &PgPool,
        crd_number: CrdNumber,
    ) -> Result<Vec<Introduction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM introductions \
             WHERE crd_number = $1 AND status = 'open' \
             ORDER BY introduced_at ASC, id ASC"
        );
        sqlx::query_as::<_, Introduction>(&query)
            .bind(crd_number)
            .fetch_all(pool)
            .await
    }

    /// Distinct CRD numbers across all currently-open introductions.
    ///
    /// Used by the reconciliation scheduler; a candidate with several open
    /// introductions is checked against the registry once.
    pub async fn distinct_open_crds(pool: &PgPool) -> Result<Vec<CrdNumber>, sqlx::Error> {
        sqlx::query_scalar::<_, CrdNumber>(
            "SELECT DISTINCT crd_number FROM introductions \
             WHERE status = 'open' ORDER BY crd_number",
        )
        .fetch_all(pool)
        .await
    }

    /// Unconditionally set the status. Returns the updated row, or `None`
    /// if the introduction does not exist.
    ///
    /// Does not enforce the transition graph; callers request only legal
    /// transitions. The open->placed edge goes through
    /// [`mark_placed_if_open`](Self::mark_placed_if_open) instead.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: IntroductionStatus,
    ) -> Result<Option<Introduction>, sqlx::Error> {
        let query = format!(
            "UPDATE introductions SET status = $1, updated_at = now() \
             WHERE id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Introduction>(&query)
            .bind(status.as_str())
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Transition open -> placed with an optimistic status guard, inside an
    /// existing transaction.
    ///
    /// The UPDATE only succeeds while the row is still `open` at write time;
    /// the loser of a racing match observes `None` and must abort without
    /// creating a placement.
    pub async fn mark_placed_if_open(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Introduction>, sqlx::Error> {
        let query = format!(
            "UPDATE introductions SET status = 'placed', updated_at = now() \
             WHERE id = $1 AND status = 'open' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Introduction>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// List introductions with optional filters and pagination.
    pub async fn list(
        pool: &PgPool,
        params: &IntroductionQuery,
    ) -> Result<Vec<Introduction>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).clamp(1, 500);
        let offset = params.offset.unwrap_or(0).max(0);

        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx = 1u32;

        if params.partner_id.is_some() {
            conditions.push(format!("partner_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.crd_number.is_some() {
            conditions.push(format!("crd_number = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.status.is_some() {
            conditions.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM introductions {where_clause} \
             ORDER BY introduced_at DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, Introduction>(&query);
        if let Some(partner_id) = params.partner_id {
            q = q.bind(partner_id);
        }
        if let Some(crd) = params.crd_number {
            q = q.bind(crd);
        }
        if let Some(ref status) = params.status {
            q = q.bind(status.as_str());
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count open introductions (for the summary-statistics endpoint).
    pub async fn count_open(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM introductions WHERE status = 'open'",
        )
        .fetch_one(pool)
        .await
    }
}
