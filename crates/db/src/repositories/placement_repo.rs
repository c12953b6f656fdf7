//! Repository for the `placements` table.
//!
//! Placement inserts run inside the same transaction as the guarded
//! introduction transition (see the attribution engine), so a placement can
//! never exist against a non-placed introduction.

use rust_decimal::Decimal;
use sqlx::PgPool;

use advlink_core::status::PlacementStatus;
use advlink_core::types::{CrdNumber, DbId, Timestamp};
use chrono::NaiveDate;

use crate::models::placement::{Placement, PlacementQuery, PlacementStatusCount};

/// Column list for `placements` SELECT queries.
const COLUMNS: &str = "\
    id, partner_id, introduction_id, hire_id, crd_number, hire_date, \
    status, fee_amount, fee_currency, terms_snapshot, created_at, updated_at";

/// Field values for a placement INSERT (everything the engine computes).
pub struct NewPlacement<'a> {
    pub partner_id: DbId,
    pub introduction_id: DbId,
    pub hire_id: DbId,
    pub crd_number: CrdNumber,
    pub hire_date: NaiveDate,
    pub fee_amount: Decimal,
    pub fee_currency: &'a str,
    pub terms_snapshot: serde_json::Value,
}

/// Provides insert, lookup, and aggregation operations for placements.
pub struct PlacementRepo;

impl PlacementRepo {
    /// Insert a placement inside an existing transaction.
    ///
    /// The `uq_placements_introduction` constraint backstops the optimistic
    /// status guard: even if two racing matchers both believed the
    /// introduction was open, only one insert can commit.
    pub async fn insert(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        new: &NewPlacement<'_>,
    ) -> Result<Placement, sqlx::Error> {
        let query = format!(
            "INSERT INTO placements \
                (partner_id, introduction_id, hire_id, crd_number, hire_date, \
                 fee_amount, fee_currency, terms_snapshot) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Placement>(&query)
            .bind(new.partner_id)
            .bind(new.introduction_id)
            .bind(new.hire_id)
            .bind(new.crd_number)
            .bind(new.hire_date)
            .bind(new.fee_amount)
            .bind(new.fee_currency)
            .bind(&new.terms_snapshot)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a placement by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Placement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM placements WHERE id = $1");
        sqlx::query_as::<_, Placement>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the placement referencing a given introduction, if any.
    pub async fn find_by_introduction(
        pool: &PgPool,
        introduction_id: DbId,
    ) -> Result<Option<Placement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM placements WHERE introduction_id = $1");
        sqlx::query_as::<_, Placement>(&query)
            .bind(introduction_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a placement's status. Returns the updated row, or `None` if
    /// the placement does not exist.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: PlacementStatus,
    ) -> Result<Option<Placement>, sqlx::Error> {
        let query = format!(
            "UPDATE placements SET status = $1, updated_at = now() \
             WHERE id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Placement>(&query)
            .bind(status.as_str())
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Placements still awaiting a successful partner notification.
    ///
    /// The retry sweep over this set lives outside the core flow; this query
    /// is its feed.
    pub async fn list_pending_notify(pool: &PgPool) -> Result<Vec<Placement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM placements \
             WHERE status = 'pending_notify' \
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Placement>(&query).fetch_all(pool).await
    }

    /// List placements with optional filters and pagination.
    pub async fn list(
        pool: &PgPool,
        params: &PlacementQuery,
    ) -> Result<Vec<Placement>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).clamp(1, 500);
        let offset = params.offset.unwrap_or(0).max(0);

        let (where_clause, bind_values, bind_idx) = build_placement_filter(params);

        let query = format!(
            "SELECT {COLUMNS} FROM placements {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, Placement>(&query);
        for val in &bind_values {
            q = match val {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count all placements (for the summary-statistics endpoint).
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM placements")
            .fetch_one(pool)
            .await
    }

    /// Aggregate placement counts and fee totals by partner and status,
    /// optionally restricted to a creation-time range.
    pub async fn summary_by_partner_status(
        pool: &PgPool,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Result<Vec<PlacementStatusCount>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx = 1u32;
        if from.is_some() {
            conditions.push(format!("p.created_at >= ${bind_idx}"));
            bind_idx += 1;
        }
        if to.is_some() {
            conditions.push(format!("p.created_at <= ${bind_idx}"));
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT p.partner_id, pa.name AS partner_name, p.status, \
                    COUNT(*)::BIGINT AS count, \
                    COALESCE(SUM(p.fee_amount), 0) AS total_fees \
             FROM placements p \
             JOIN partners pa ON pa.id = p.partner_id \
             {where_clause} \
             GROUP BY p.partner_id, pa.name, p.status \
             ORDER BY pa.name, p.status"
        );

        let mut q = sqlx::query_as::<_, PlacementStatusCount>(&query);
        if let Some(from) = from {
            q = q.bind(from);
        }
        if let Some(to) = to {
            q = q.bind(to);
        }
        q.fetch_all(pool).await
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built placement queries.
enum BindValue {
    BigInt(i64),
    Text(String),
    Timestamp(Timestamp),
}

/// Build a WHERE clause and bind values from `PlacementQuery` filters.
///
/// Returns `(where_clause, bind_values, next_bind_index)`.
fn build_placement_filter(params: &PlacementQuery) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(partner_id) = params.partner_id {
        conditions.push(format!("partner_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(partner_id));
    }
    if let Some(crd) = params.crd_number {
        conditions.push(format!("crd_number = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(crd));
    }
    if let Some(ref status) = params.status {
        conditions.push(format!("status = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(status.clone()));
    }
    if let Some(from) = params.from {
        conditions.push(format!("created_at >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(from));
    }
    if let Some(to) = params.to {
        conditions.push(format!("created_at <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(to));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}
