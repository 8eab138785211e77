//! Shared types and result types for the database layer

pub mod errors;

use chrono::{SecondsFormat, Utc};

pub use errors::DatabaseError;

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Current UTC time as a fixed-width RFC 3339 string, so stored timestamps sort lexically.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
