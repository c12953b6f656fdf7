//! Fire-and-forget audit trail writer.
//!
//! Audit persistence must never abort the enclosing business operation:
//! insert failures are logged and swallowed.

use advlink_core::audit::redact_sensitive_fields;
use advlink_db::models::audit::CreateAuditLog;
use advlink_db::repositories::AuditRepo;
use advlink_db::DbPool;

/// Write an audit entry, logging (not propagating) any failure.
///
/// Old/new values are redacted before storage so partner secrets never land
/// in the trail.
pub async fn record(pool: &DbPool, mut entry: CreateAuditLog) {
    entry.old_value = entry.old_value.as_ref().map(redact_sensitive_fields);
    entry.new_value = entry.new_value.as_ref().map(redact_sensitive_fields);

    if let Err(e) = AuditRepo::insert(pool, &entry).await {
        tracing::warn!(
            entity_type = entry.entity_type,
            entity_id = entry.entity_id,
            event_type = entry.event_type,
            error = %e,
            "Failed to write audit entry"
        );
    }
}
