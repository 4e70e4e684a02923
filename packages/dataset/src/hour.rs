//! Hour-of-day extraction from heterogeneous time representations.
//!
//! The occurrence source records the time of day inconsistently: proper
//! `HH:MM[:SS]` strings, numeric `HHMM`/`HHMMSS` values, bare hours, full
//! timestamps, and free text. Extraction never fails. Anything that does
//! not yield an hour in `0..=23` becomes hour 0, which downstream code
//! treats as "unknown" for occurrences.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike as _};

use crate::parsing::parse_datetime;

/// Clock layouts accepted for text containing a colon, tried in order.
const CLOCK_FORMATS: &[&str] = &[
    "%H:%M:%S%.f",
    "%H:%M:%S",
    "%H:%M",
    "%I:%M:%S %p",
    "%I:%M %p",
];

const SECONDS_PER_DAY: i64 = 86_400;

/// A single raw time-of-day value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawHour {
    /// A full timestamp; its hour is used.
    Timestamp(NaiveDateTime),
    /// A duration since midnight; its whole-hours component is used.
    Duration(TimeDelta),
    /// Free text.
    Text(String),
}

impl RawHour {
    /// Classifies a table cell. Full timestamps and `"<n> days HH:MM:SS"`
    /// durations are recognized; everything else is kept as text.
    #[must_use]
    pub fn from_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.len() > 10
            && let Some(dt) = parse_datetime(trimmed)
        {
            return Self::Timestamp(dt);
        }
        if let Some(delta) = parse_day_duration(trimmed) {
            return Self::Duration(delta);
        }
        Self::Text(cell.to_string())
    }
}

/// Parses pandas-style `"1 days 02:30:00"` / `"0 day 14:00:00"` durations.
fn parse_day_duration(s: &str) -> Option<TimeDelta> {
    let mut parts = s.split_whitespace();
    let days = parts.next()?.parse::<i64>().ok()?;
    if !matches!(parts.next()?, "day" | "days") {
        return None;
    }
    let clock = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let time = parse_clock(clock)?;
    let secs = i64::from(time.num_seconds_from_midnight());
    TimeDelta::try_days(days)?.checked_add(&TimeDelta::try_seconds(secs)?)
}

fn parse_clock(s: &str) -> Option<NaiveTime> {
    CLOCK_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(s, format).ok())
}

/// Extracts the hour from free text.
///
/// Text with a colon is parsed as a clock time. Otherwise all non-digits
/// are stripped: three or more remaining digits yield the first two as the
/// hour (`"2130"` is 21, `"083000"` is 8), two or fewer are the hour
/// itself.
fn parse_text_hour(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.contains(':') {
        return parse_clock(text).map(|t| t.hour());
    }
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let hour_digits = if digits.len() > 2 { &digits[..2] } else { digits.as_str() };
    hour_digits.parse().ok()
}

/// Extracts an hour in `0..=23`, or `None` if the value yields no valid
/// hour.
#[must_use]
pub fn parse_hour(raw: &RawHour) -> Option<u8> {
    let hour = match raw {
        RawHour::Timestamp(dt) => dt.hour(),
        RawHour::Duration(delta) => {
            let secs = delta.num_seconds().rem_euclid(SECONDS_PER_DAY);
            u32::try_from(secs / 3600).ok()?
        }
        RawHour::Text(text) => parse_text_hour(text)?,
    };
    u8::try_from(hour).ok().filter(|h| *h <= 23)
}

/// Extracts an hour in `0..=23`, defaulting to 0.
#[must_use]
pub fn extract_hour(raw: Option<&RawHour>) -> u8 {
    raw.and_then(parse_hour).unwrap_or(0)
}

/// Extracts one hour per row from a column. An absent column yields 0 for
/// all `rows`.
#[must_use]
pub fn extract_hours(column: Option<&[Option<RawHour>]>, rows: usize) -> Vec<u8> {
    column.map_or_else(
        || vec![0; rows],
        |values| values.iter().map(|v| extract_hour(v.as_ref())).collect(),
    )
}

/// Counts the rows of a column that yield no valid hour and therefore
/// default to 0. An absent column defaults every row.
#[must_use]
pub fn count_defaulted(column: Option<&[Option<RawHour>]>, rows: usize) -> usize {
    column.map_or(rows, |values| {
        values
            .iter()
            .filter(|v| v.as_ref().and_then(parse_hour).is_none())
            .count()
    })
}
