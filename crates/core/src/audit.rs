//! Audit trail constants and helpers.
//!
//! The audit log is an append-only record of state transitions, written
//! fire-and-forget by the ledgers and the attribution engine. This module
//! only holds the shared vocabulary; persistence lives in `advlink-db`.

// ---------------------------------------------------------------------------
// Entity type constants
// ---------------------------------------------------------------------------

/// Known entity types for audit log entries.
pub mod entity_types {
    pub const PARTNER: &str = "partner";
    pub const INTRODUCTION: &str = "introduction";
    pub const HIRE: &str = "hire";
    pub const PLACEMENT: &str = "placement";
    pub const RECONCILIATION: &str = "reconciliation";
}

// ---------------------------------------------------------------------------
// Event type constants
// ---------------------------------------------------------------------------

/// Known event types for audit log entries.
pub mod event_types {
    pub const CREATED: &str = "created";
    pub const STATUS_CHANGED: &str = "status_changed";
    pub const TERMS_UPDATED: &str = "terms_updated";
    pub const SECRET_ROTATED: &str = "secret_rotated";
    pub const TERMINATION_SET: &str = "termination_set";
    pub const RUN_COMPLETED: &str = "run_completed";
    pub const RUN_SKIPPED: &str = "run_skipped";
}

// ---------------------------------------------------------------------------
// Source constants
// ---------------------------------------------------------------------------

/// Known sources for audit log entries (who initiated the change).
pub mod sources {
    pub const PARTNER_API: &str = "partner_api";
    pub const ADMIN_API: &str = "admin_api";
    pub const ATTRIBUTION_ENGINE: &str = "attribution_engine";
    pub const RECONCILIATION: &str = "reconciliation";
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

/// Fields redacted from audit details before storage.
pub const SENSITIVE_FIELDS: &[&str] = &["secret", "secret_hash", "api_key", "notify_secret"];

/// Redact sensitive fields from a JSON value (recursive on objects/arrays).
///
/// Replaces the value of any key containing a [`SENSITIVE_FIELDS`] substring
/// with `"[REDACTED]"`.
pub fn redact_sensitive_fields(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(
                        key.clone(),
                        serde_json::Value::String("[REDACTED]".to_string()),
                    );
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            serde_json::Value::Object(redacted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(redact_sensitive_fields).collect())
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_secret_fields() {
        let value = json!({
            "name": "Northstar Search",
            "secret_hash": "abc123",
            "nested": { "notify_secret": "hunter2" }
        });

        let redacted = redact_sensitive_fields(&value);

        assert_eq!(redacted["name"], "Northstar Search");
        assert_eq!(redacted["secret_hash"], "[REDACTED]");
        assert_eq!(redacted["nested"]["notify_secret"], "[REDACTED]");
    }

    #[test]
    fn non_sensitive_values_unchanged() {
        let value = json!({ "crd_number": 555, "items": [1, 2, 3] });
        assert_eq!(redact_sensitive_fields(&value), value);
    }
}
