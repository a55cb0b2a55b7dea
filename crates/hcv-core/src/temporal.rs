//! # Temporal Types: UTC-Only Timestamps
//!
//! Defines `Timestamp`, a UTC-only timestamp truncated to seconds precision.
//!
//! Expiry is decided at second granularity: two instants that differ only
//! in their fractional part are the same instant here. The validation clock
//! handed to rule predicates is rendered as `YYYY-MM-DDTHH:MM:SSZ`, no
//! sub-seconds and always `Z`.
//!
//! ## Credential Date Grammar
//!
//! Structured credentials carry their expiration as a string, and predicate
//! date operators take string operands. Both go through
//! [`Timestamp::parse_credential_date`], which accepts, in order:
//!
//! 1. RFC 3339 (`Z` or numeric offset, optional fraction).
//! 2. `YYYY-MM-DDTHH:MM:SS±HHMM` (offset without colon), optional fraction.
//! 3. `YYYY-MM-DDTHH:MM:SS` with no offset, read as UTC.
//! 4. `YYYY-MM-DD`, read as midnight UTC.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HcvError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`]: current UTC time, truncated.
/// - [`Timestamp::from_utc()`]: from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::parse()`]: strict `Z`-suffixed RFC 3339.
/// - [`Timestamp::parse_credential_date()`]: the lenient credential grammar.
/// - [`Timestamp::from_epoch_secs()`]: POSIX seconds, as carried by compact tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a `Z`-suffixed RFC 3339 string.
    ///
    /// # Errors
    ///
    /// Returns [`HcvError::InvalidTimestamp`] if the string is not RFC 3339
    /// or uses an offset other than `Z`.
    pub fn parse(s: &str) -> Result<Self, HcvError> {
        if !s.ends_with('Z') {
            return Err(HcvError::InvalidTimestamp {
                input: s.to_string(),
                reason: "must use Z suffix (UTC only)".to_string(),
            });
        }
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| HcvError::InvalidTimestamp {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_utc(dt.with_timezone(&Utc)))
    }

    /// Parse a date string using the credential date grammar (see module docs).
    ///
    /// Returns `None` when no form matches. Callers decide what absence
    /// means; the expiry evaluator treats it as "does not expire".
    pub fn parse_credential_date(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Self::from_utc(dt.with_timezone(&Utc)));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"] {
            if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
                return Some(Self::from_utc(dt.with_timezone(&Utc)));
            }
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Self::from_utc(naive.and_utc()));
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Self::from_utc(naive.and_utc()))
    }

    /// Create a timestamp from a Unix epoch timestamp (seconds).
    pub fn from_epoch_secs(secs: i64) -> Result<Self, HcvError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or(HcvError::EpochOutOfRange(secs))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Shift this instant by `amount` units. Negative amounts go backwards.
    ///
    /// Month and year arithmetic clamps to the last day of the target month
    /// (`2024-01-31` plus one month is `2024-02-29`).
    pub fn checked_add(&self, amount: i64, unit: TimeUnit) -> Result<Self, HcvError> {
        let overflow = || HcvError::DateOverflow(format!("{self} + {amount} {}", unit.as_str()));
        let shifted = match unit {
            TimeUnit::Year | TimeUnit::Month => {
                let months = if unit == TimeUnit::Year {
                    amount.checked_mul(12).ok_or_else(overflow)?
                } else {
                    amount
                };
                let magnitude = u32::try_from(months.unsigned_abs()).map_err(|_| overflow())?;
                if months >= 0 {
                    self.0.checked_add_months(Months::new(magnitude))
                } else {
                    self.0.checked_sub_months(Months::new(magnitude))
                }
            }
            TimeUnit::Day => TimeDelta::try_days(amount).and_then(|d| self.0.checked_add_signed(d)),
            TimeUnit::Hour => {
                TimeDelta::try_hours(amount).and_then(|d| self.0.checked_add_signed(d))
            }
            TimeUnit::Minute => {
                TimeDelta::try_minutes(amount).and_then(|d| self.0.checked_add_signed(d))
            }
            TimeUnit::Second => {
                TimeDelta::try_seconds(amount).and_then(|d| self.0.checked_add_signed(d))
            }
        };
        shifted.map(Self).ok_or_else(overflow)
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Calendar unit accepted by [`Timestamp::checked_add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl TimeUnit {
    /// Parse a unit name. Singular and plural forms are both accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "year" | "years" => Some(Self::Year),
            "month" | "months" => Some(Self::Month),
            "day" | "days" => Some(Self::Day),
            "hour" | "hours" => Some(Self::Hour),
            "minute" | "minutes" => Some(Self::Minute),
            "second" | "seconds" => Some(Self::Second),
            _ => None,
        }
    }

    /// Canonical singular name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
        }
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_has_no_subseconds() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn test_from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 45).unwrap();
        let dt_with_nanos = dt.with_nanosecond(999_999_999).unwrap();
        let ts = Timestamp::from_utc(dt_with_nanos);
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:30:45Z");
    }

    #[test]
    fn test_display_matches_iso8601() {
        let dt = Utc.with_ymd_and_hms(2026, 6, 30, 23, 59, 59).unwrap();
        let ts = Timestamp::from_utc(dt);
        assert_eq!(format!("{ts}"), ts.to_iso8601());
    }

    // ---- parse() strict mode ----

    #[test]
    fn test_parse_z_suffix_accepted() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_parse_offset_rejected() {
        assert!(Timestamp::parse("2026-01-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2026-01-15T08:00:00-04:00").is_err());
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(Timestamp::parse("not-a-date").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    // ---- credential date grammar ----

    #[test]
    fn grammar_rfc3339_with_offset_normalizes_to_utc() {
        let ts = Timestamp::parse_credential_date("2026-01-15T17:00:00+05:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn grammar_fraction_is_truncated() {
        let ts = Timestamp::parse_credential_date("2026-01-15T12:00:00.987Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn grammar_compact_offset() {
        let ts = Timestamp::parse_credential_date("2026-01-15T12:00:00+0100").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T11:00:00Z");
    }

    #[test]
    fn grammar_naive_datetime_is_utc() {
        let ts = Timestamp::parse_credential_date("2026-01-15T12:00:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn grammar_date_only_is_midnight() {
        let ts = Timestamp::parse_credential_date("2026-01-15").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T00:00:00Z");
    }

    #[test]
    fn grammar_rejects_garbage() {
        assert!(Timestamp::parse_credential_date("").is_none());
        assert!(Timestamp::parse_credential_date("   ").is_none());
        assert!(Timestamp::parse_credential_date("15/01/2026").is_none());
        assert!(Timestamp::parse_credential_date("2026-13-01").is_none());
    }

    // ---- epoch ----

    #[test]
    fn test_epoch_roundtrip() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let ts2 = Timestamp::from_epoch_secs(ts.epoch_secs()).unwrap();
        assert_eq!(ts, ts2);
    }

    #[test]
    fn test_epoch_out_of_range() {
        assert!(matches!(
            Timestamp::from_epoch_secs(i64::MAX),
            Err(HcvError::EpochOutOfRange(_))
        ));
    }

    // ---- arithmetic ----

    #[test]
    fn add_hours_and_days() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        assert_eq!(
            ts.checked_add(72, TimeUnit::Hour).unwrap().to_iso8601(),
            "2026-01-18T12:00:00Z"
        );
        assert_eq!(
            ts.checked_add(-1, TimeUnit::Day).unwrap().to_iso8601(),
            "2026-01-14T12:00:00Z"
        );
    }

    #[test]
    fn add_month_clamps_to_month_end() {
        let ts = Timestamp::parse("2024-01-31T00:00:00Z").unwrap();
        assert_eq!(
            ts.checked_add(1, TimeUnit::Month).unwrap().to_iso8601(),
            "2024-02-29T00:00:00Z"
        );
    }

    #[test]
    fn add_negative_years() {
        let ts = Timestamp::parse("2026-06-01T00:00:00Z").unwrap();
        assert_eq!(
            ts.checked_add(-18, TimeUnit::Year).unwrap().to_iso8601(),
            "2008-06-01T00:00:00Z"
        );
    }

    #[test]
    fn add_overflow_is_error() {
        let ts = Timestamp::parse("2026-06-01T00:00:00Z").unwrap();
        assert!(ts.checked_add(i64::MAX, TimeUnit::Year).is_err());
        assert!(ts.checked_add(i64::MAX, TimeUnit::Second).is_err());
    }

    #[test]
    fn time_unit_names() {
        assert_eq!(TimeUnit::from_name("days"), Some(TimeUnit::Day));
        assert_eq!(TimeUnit::from_name("hour"), Some(TimeUnit::Hour));
        assert_eq!(TimeUnit::from_name("fortnight"), None);
        assert_eq!(TimeUnit::Month.as_str(), "month");
    }

    #[test]
    fn test_ordering() {
        let earlier = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let later = Timestamp::parse("2026-01-15T12:00:01Z").unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn test_serde_roundtrip() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }

    proptest::proptest! {
        #[test]
        fn epoch_seconds_render_without_fraction(secs in 0i64..4_102_444_800) {
            let ts = Timestamp::from_epoch_secs(secs).unwrap();
            let rendered = ts.to_iso8601();
            proptest::prop_assert_eq!(rendered.len(), 20);
            proptest::prop_assert!(rendered.ends_with('Z'));
            proptest::prop_assert_eq!(Timestamp::parse(&rendered).unwrap(), ts);
        }
    }
}
