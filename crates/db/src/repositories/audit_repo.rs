//! Repository for the `audit_log` table.

use sqlx::PgPool;

use advlink_core::types::Timestamp;

use crate::models::audit::{AuditLog, AuditQuery, CreateAuditLog};

/// Column list for `audit_log` SELECT queries.
const COLUMNS: &str = "\
    id, entity_type, entity_id, event_type, old_value, new_value, \
    source, created_at";

/// Provides insert and query operations for the append-only audit trail.
pub struct AuditRepo;

impl AuditRepo {
    /// Insert a single audit log entry.
    pub async fn insert(pool: &PgPool, entry: &CreateAuditLog) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_log \
                (entity_type, entity_id, event_type, old_value, new_value, source) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(entry.entity_type)
            .bind(entry.entity_id)
            .bind(entry.event_type)
            .bind(&entry.old_value)
            .bind(&entry.new_value)
            .bind(entry.source)
            .fetch_one(pool)
            .await
    }

    /// Query audit logs with filtering and pagination, newest first.
    pub async fn query(pool: &PgPool, params: &AuditQuery) -> Result<Vec<AuditLog>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).clamp(1, 500);
        let offset = params.offset.unwrap_or(0).max(0);

        let (where_clause, bind_values, bind_idx) = build_audit_filter(params);

        let query = format!(
            "SELECT {COLUMNS} FROM audit_log {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, AuditLog>(&query);
        for val in &bind_values {
            q = match val {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count entries for a given entity, optionally restricted by event type.
    ///
    /// Used by tests asserting that idempotent duplicates do not produce a
    /// second CREATE entry.
    pub async fn count_for_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: i64,
        event_type: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        match event_type {
            Some(event_type) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*)::BIGINT FROM audit_log \
                     WHERE entity_type = $1 AND entity_id = $2 AND event_type = $3",
                )
                .bind(entity_type)
                .bind(entity_id)
                .bind(event_type)
                .fetch_one(pool)
                .await
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*)::BIGINT FROM audit_log \
                     WHERE entity_type = $1 AND entity_id = $2",
                )
                .bind(entity_type)
                .bind(entity_id)
                .fetch_one(pool)
                .await
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built audit log queries.
enum BindValue {
    BigInt(i64),
    Text(String),
    Timestamp(Timestamp),
}

/// Build a WHERE clause and bind values from `AuditQuery` filter parameters.
fn build_audit_filter(params: &AuditQuery) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(ref entity_type) = params.entity_type {
        conditions.push(format!("entity_type = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(entity_type.clone()));
    }
    if let Some(entity_id) = params.entity_id {
        conditions.push(format!("entity_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(entity_id));
    }
    if let Some(ref event_type) = params.event_type {
        conditions.push(format!("event_type = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(event_type.clone()));
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
