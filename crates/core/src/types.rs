/// User primary keys are SQLite INTEGER rowids.
pub type DbId = i64;

/// Listings, bookings and reviews are keyed by random UUIDs.
pub type EntityId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (check-in / check-out) carry no time zone.
pub type Date = chrono::NaiveDate;
