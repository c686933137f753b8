/// Server-assigned record identifiers are integers.
pub type ResourceId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
