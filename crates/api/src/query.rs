//! Shared query parameter types for API handlers.

use serde::Deserialize;

use advlink_core::types::Timestamp;

/// Time-range parameters for the summary-statistics endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct TimeRangeParams {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}
