//! Repository for the `partners` table.

use sqlx::PgPool;

use advlink_core::types::DbId;

use crate::models::partner::{CreatePartner, Partner, UpdatePartner};

/// Column list for `partners` SELECT queries.
const COLUMNS: &str = "\
    id, name, fee_flat, fee_percent, attribution_window_months, \
    notify_url, notify_secret, secret_hash, secret_prefix, is_active, \
    created_at, updated_at";

/// Provides CRUD operations for partners.
pub struct PartnerRepo;

impl PartnerRepo {
    /// Insert a new partner with a pre-hashed API secret.
    ///
    /// The unique constraint on `name` surfaces as a 23505 database error
    /// for the caller to classify as a conflict.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePartner,
        secret_hash: &str,
        secret_prefix: &str,
    ) -> Result<Partner, sqlx::Error> {
        let query = format!(
            "INSERT INTO partners \
                (name, fee_flat, fee_percent, attribution_window_months, \
                 notify_url, notify_secret, secret_hash, secret_prefix) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Partner>(&query)
            .bind(input.name.trim())
            .bind(input.fee_flat)
            .bind(input.fee_percent)
            .bind(input.attribution_window_months)
            .bind(&input.notify_url)
            .bind(&input.notify_secret)
            .bind(secret_hash)
            .bind(secret_prefix)
            .fetch_one(pool)
            .await
    }

    /// Find a partner by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Partner>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM partners WHERE id = $1");
        sqlx::query_as::<_, Partner>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active partner by the SHA-256 hash of its API secret.
    ///
    /// Used by the authentication extractor. Disabled partners do not
    /// authenticate.
    pub async fn find_by_secret_hash(
        pool: &PgPool,
        secret_hash: &str,
    ) -> Result<Option<Partner>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM partners \
             WHERE secret_hash = $1 AND is_active = TRUE"
        );
        sqlx::query_as::<_, Partner>(&query)
            .bind(secret_hash)
            .fetch_optional(pool)
            .await
    }

    /// List all partners, active first, then by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Partner>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM partners ORDER BY is_active DESC, name ASC");
        sqlx::query_as::<_, Partner>(&query).fetch_all(pool).await
    }

    /// Update a partner's terms and notification endpoint.
    ///
    /// `None` fields are left unchanged. Returns the updated row, or `None`
    /// if the partner does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePartner,
    ) -> Result<Option<Partner>, sqlx::Error> {
        let query = format!(
            "UPDATE partners SET \
                name = COALESCE($1, name), \
                fee_flat = COALESCE($2, fee_flat), \
                fee_percent = COALESCE($3, fee_percent), \
                attribution_window_months = COALESCE($4, attribution_window_months), \
                notify_url = COALESCE($5, notify_url), \
                notify_secret = COALESCE($6, notify_secret), \
                updated_at = now() \
             WHERE id = $7 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Partner>(&query)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.fee_flat)
            .bind(input.fee_percent)
            .bind(input.attribution_window_months)
            .bind(&input.notify_url)
            .bind(&input.notify_secret)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace the partner's secret hash and prefix in a single UPDATE.
    ///
    /// One statement means there is no window where the old and new secrets
    /// are both valid (or neither is). Returns the updated row, or `None`
    /// if the partner does not exist.
    pub async fn rotate_secret(
        pool: &PgPool,
        id: DbId,
        secret_hash: &str,
        secret_prefix: &str,
    ) -> Result<Option<Partner>, sqlx::Error> {
        let query = format!(
            "UPDATE partners SET \
                secret_hash = $1, secret_prefix = $2, updated_at = now() \
             WHERE id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Partner>(&query)
            .bind(secret_hash)
            .bind(secret_prefix)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Soft-enable or soft-disable a partner.
    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<Partner>, sqlx::Error> {
        let query = format!(
            "UPDATE partners SET is_active = $1, updated_at = now() \
             WHERE id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Partner>(&query)
            .bind(is_active)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
