//! Repository for the `hires` table.

use sqlx::PgPool;

use advlink_core::status::HireSource;
use advlink_core::types::DbId;
use chrono::NaiveDate;

use crate::models::hire::{CreateHire, Hire, HireCreateResult, HireQuery};

/// Column list for `hires` SELECT queries.
const COLUMNS: &str = "\
    id, crd_number, advisor_name, firm_name, firm_crd, hire_date, \
    termination_date, source, source_ref, created_at, updated_at";

/// Provides CRUD operations for hires.
pub struct HireRepo;

impl HireRepo {
    /// Idempotent create keyed on `(crd_number, firm_name, hire_date)`.
    ///
    /// A duplicate triple returns the existing row unchanged with
    /// `created` false; callers only trigger attribution for genuinely new
    /// hires. Pure data operation -- never invokes the attribution engine
    /// itself.
    pub async fn create(
        pool: &PgPool,
        input: &CreateHire,
        source: HireSource,
    ) -> Result<HireCreateResult, sqlx::Error> {
        let query = format!(
            "INSERT INTO hires \
                (crd_number, advisor_name, firm_name, firm_crd, hire_date, source, source_ref) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT ON CONSTRAINT uq_hires_crd_firm_date DO NOTHING \
             RETURNING {COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, Hire>(&query)
            .bind(input.crd_number)
            .bind(input.advisor_name.trim())
            .bind(input.firm_name.trim())
            .bind(input.firm_crd)
            .bind(input.hire_date)
            .bind(source.as_str())
            .bind(&input.source_ref)
            .fetch_optional(pool)
            .await?;

        if let Some(hire) = inserted {
            return Ok(HireCreateResult {
                hire,
                created: true,
            });
        }

        let query = format!(
            "SELECT {COLUMNS} FROM hires \
             WHERE crd_number = $1 AND firm_name = $2 AND hire_date = $3"
        );
        let existing = sqlx::query_as::<_, Hire>(&query)
            .bind(input.crd_number)
            .bind(input.firm_name.trim())
            .bind(input.hire_date)
            .fetch_one(pool)
            .await?;

        Ok(HireCreateResult {
            hire: existing,
            created: false,
        })
    }

    /// Find a hire by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Hire>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hires WHERE id = $1");
        sqlx::query_as::<_, Hire>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record a termination date. Unconditional update; returns `None` if
    /// the hire does not exist.
    pub async fn set_termination_date(
        pool: &PgPool,
        id: DbId,
        termination_date: NaiveDate,
    ) -> Result<Option<Hire>, sqlx::Error> {
        let query = format!(
            "UPDATE hires SET termination_date = $1, updated_at = now() \
             WHERE id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hire>(&query)
            .bind(termination_date)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List hires with optional filters and pagination.
    pub async fn list(pool: &PgPool, params: &HireQuery) -> Result<Vec<Hire>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).clamp(1, 500);
        let offset = params.offset.unwrap_or(0).max(0);

        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx = 1u32;

        if params.crd_number.is_some() {
            conditions.push(format!("crd_number = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.source.is_some() {
            conditions.push(format!("source = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM hires {where_clause} \
             ORDER BY hire_date DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, Hire>(&query);
        if let Some(crd) = params.crd_number {
            q = q.bind(crd);
        }
        if let Some(ref source) = params.source {
            q = q.bind(source.as_str());
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count all hires (for the summary-statistics endpoint).
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM hires")
            .fetch_one(pool)
            .await
    }
}
