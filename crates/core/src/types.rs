/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A regulatory CRD number identifying a financial-industry individual
/// (or, for firms, the firm itself). Always positive. Stable across
/// employers, so it serves as the cross-system candidate key.
pub type CrdNumber = i64;
