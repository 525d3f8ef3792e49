//! Second-precision Unix timestamps.
//!
//! Stored as RFC 3339 UTC text (`2024-01-02T03:04:05Z`). Every stored value has
//! the same width, so lexicographic order on the text column is time order and
//! `MAX(updated)` can be computed by the store without parsing.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Naive layouts accepted in addition to RFC 3339, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Seconds since the Unix epoch.
///
/// [`Timestamp::EPOCH`] doubles as the "never synchronized" watermark.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The Unix epoch.
    pub const EPOCH: Self = Self(0);

    /// Creates a timestamp from seconds since the Unix epoch.
    #[must_use]
    pub const fn from_unix(secs: i64) -> Self {
        Self(secs)
    }

    /// Returns the seconds since the Unix epoch.
    #[must_use]
    pub const fn as_unix(&self) -> i64 {
        self.0
    }

    /// Returns true for the epoch, i.e. a table that was never synchronized.
    #[must_use]
    pub const fn is_epoch(&self) -> bool {
        self.0 == 0
    }

    /// The current wall-clock time, truncated to seconds.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    /// Parses RFC 3339 text or SQLite's `YYYY-MM-DD HH:MM:SS[.fff][+zz:zz]` form.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(Self(dt.timestamp()));
        }
        // SQLite separates date and time with a space.
        if let Ok(dt) = DateTime::parse_from_rfc3339(&input.replacen(' ', "T", 1)) {
            return Ok(Self(dt.timestamp()));
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
                return Ok(Self(naive.and_utc().timestamp()));
            }
        }
        Err(Error::InvalidTimestamp(input.to_string()))
    }

    /// Renders the storage representation.
    ///
    /// Values outside chrono's range fall back to the raw second count.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        DateTime::<Utc>::from_timestamp(self.0, 0)
            .map(|dt| dt.format(STORAGE_FORMAT).to_string())
            .unwrap_or_else(|| self.0.to_string())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp())
    }
}
