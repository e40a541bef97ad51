//! # Temporal Types
//!
//! `Timestamp` is the UTC-only, second-precision instant used for transition
//! records, session bookkeeping and export snapshots. Keeping sub-seconds and
//! offsets out means a snapshot canonicalizes to the same bytes no matter
//! which machine produced it.
//!
//! Milestone dates are different: they are calendar dates entered by a
//! person (`2024-03-18`) and stay plain strings inside the tracker.
//! [`parse_calendar_date`] is the validation the presentation layer applies
//! before handing one over.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LgxError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`]: current UTC time, truncated.
/// - [`Timestamp::from_utc()`]: from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::parse()`]: from an RFC 3339 string with `Z` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Wrap a `DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 timestamp. Only the `Z` suffix is accepted.
    pub fn parse(s: &str) -> Result<Self, LgxError> {
        if !s.ends_with('Z') {
            return Err(LgxError::InvalidDate(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| LgxError::InvalidDate(format!("invalid RFC 3339 timestamp {s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as ISO8601 with Z suffix (e.g. `2024-03-18T09:30:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

/// Validate a milestone calendar date in `YYYY-MM-DD` form.
///
/// Returns the normalised string (zero-padded) so that `2024-3-8` is stored
/// as `2024-03-08`.
pub fn parse_calendar_date(s: &str) -> Result<String, LgxError> {
    let trimmed = s.trim();
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|e| LgxError::InvalidDate(format!("expected YYYY-MM-DD, got {trimmed:?}: {e}")))?;
    Ok(date.format("%Y-%m-%d").to_string())
}
