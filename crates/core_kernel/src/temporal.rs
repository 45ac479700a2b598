//! Clocks and lenient date parsing
//!
//! Quote evaluation depends on "now" in two places: the default quote date
//! and the time-ordered quote id. Both go through the [`Clock`] trait so
//! callers can pin time in tests.
//!
//! Stored rule dates come from hand-edited documents, so parsing accepts the
//! handful of shapes those documents actually contain.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Unparsable date: {0:?}")]
    Unparsable(String),
}

/// Source of the current instant
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Midnight UTC at the given calendar date
    pub fn at_date(year: i32, month: u32, day: u32) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
            .single()
            .map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parses a stored date or timestamp, returning `None` when nothing fits
///
/// Accepted shapes, tried in order:
/// - RFC 3339 with offset (`2024-05-01T10:00:00+05:30`, `...Z`)
/// - RFC 2822 (`Tue, 01 Jan 2030 00:00:00 GMT`)
/// - ISO date-time with a colon-less offset (`2030-01-01T00:00:00.000+0000`)
/// - naive date-time, interpreted as UTC
/// - calendar date, year-month (`2030-01`) or bare year (`2030`), each
///   interpreted as the first midnight UTC they name
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return midnight_utc(date);
        }
    }

    partial_date(trimmed).and_then(midnight_utc)
}

/// Reads `YYYY-MM` and `YYYY` as the first day they cover
fn partial_date(trimmed: &str) -> Option<NaiveDate> {
    let digits = |part: &str, len: usize| part.len() == len && part.bytes().all(|b| b.is_ascii_digit());

    match trimmed.split_once('-') {
        Some((year, month)) if digits(year, 4) && digits(month, 2) => {
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
        }
        None if digits(trimmed, 4) => NaiveDate::from_ymd_opt(trimmed.parse().ok()?, 1, 1),
        _ => None,
    }
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parses a caller-supplied date, failing loudly on garbage
pub fn parse_instant_strict(raw: &str) -> Result<DateTime<Utc>, TemporalError> {
    parse_instant(raw).ok_or_else(|| TemporalError::Unparsable(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_calendar_date_is_midnight_utc() {
        let parsed = parse_instant("2024-03-01").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = parse_instant("2024-03-01T05:30:00+05:30").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_datetime() {
        let parsed = parse_instant("2024-03-01T12:15:00.250").unwrap();
        assert_eq!(parsed.timestamp_millis() % 1000, 250);
    }

    #[test]
    fn test_parse_partial_dates() {
        let january = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_instant("2030"), Some(january));
        assert_eq!(parse_instant("2030-01"), Some(january));
        assert_eq!(parse_instant("2030-13"), None);
        assert_eq!(parse_instant("30-01"), None);
    }

    #[test]
    fn test_parse_offset_without_colon() {
        assert_eq!(
            parse_instant("2030-01-01T05:30:00.000+0530"),
            Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_instant("soon"), None);
        assert_eq!(parse_instant("   "), None);
        assert_eq!(
            parse_instant_strict("2024-13-45"),
            Err(TemporalError::Unparsable("2024-13-45".to_string()))
        );
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::at_date(2024, 6, 15).unwrap();
        assert_eq!(clock.now(), Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap());
    }
}
