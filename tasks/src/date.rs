//! Timestamp conversions between the storage and display representations.
//!
//! Tasks store `createdAt` as a sortable `yyyy-MM-dd HH:mm:ss` string in local
//! time. Reads turn it into a human-readable `Monday October 2026, 3:04PM`.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use tasklist_core::environment::Clock;
use thiserror::Error;

/// `chrono` pattern of the storage representation (`yyyy-MM-dd HH:mm:ss`)
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `chrono` pattern of the display representation (`EEEE MMMM yyyy, h:mma`)
pub const DISPLAY_FORMAT: &str = "%A %B %Y, %-I:%M%p";

/// Errors from timestamp conversion
#[derive(Debug, Error)]
pub enum DateError {
    /// The input is not a storage-format timestamp
    #[error("timestamp {input:?} does not match the storage format: {source}")]
    Parse {
        /// The rejected input
        input: String,
        /// Underlying parse failure
        #[source]
        source: chrono::ParseError,
    },
}

/// Render a timestamp in storage format
#[must_use]
pub fn to_storage<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format(STORAGE_FORMAT).to_string()
}

/// Current time from `clock`, rendered in storage format in the local time zone
#[must_use]
pub fn storage_now(clock: &dyn Clock) -> String {
    to_storage(&clock.now().with_timezone(&Local))
}

/// Convert a storage-format timestamp to display format
///
/// # Errors
///
/// Returns [`DateError::Parse`] if `storage` does not match [`STORAGE_FORMAT`].
pub fn to_display(storage: &str) -> Result<String, DateError> {
    let parsed = NaiveDateTime::parse_from_str(storage, STORAGE_FORMAT).map_err(|source| {
        DateError::Parse {
            input: storage.to_string(),
            source,
        }
    })?;
    Ok(parsed.format(DISPLAY_FORMAT).to_string())
}
