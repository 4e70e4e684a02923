//! Shared parsing utilities for both datasets.
//!
//! Date, coordinate and text-cleanup helpers used by the occurrence and
//! event normalizers.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Datetime layouts accepted for source dates, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Date-only layouts, parsed as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Parses a source date or datetime string.
///
/// Accepts RFC 3339 (the offset is dropped and the local wall-clock time
/// kept), ISO 8601 with or without seconds and fractional seconds, and
/// day-first `DD/MM/YYYY` dates. Returns `None` for anything else.
#[must_use]
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parses a coordinate from text. Accepts a decimal comma when the value
/// has no decimal point. Returns `None` if empty, unparseable, or not
/// finite.
#[must_use]
pub fn parse_coordinate(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let value = s.parse::<f64>().ok().or_else(|| {
        if s.contains('.') {
            None
        } else {
            s.replace(',', ".").parse::<f64>().ok()
        }
    })?;
    value.is_finite().then_some(value)
}

/// Coerces a JSON number or numeric string to a coordinate.
#[must_use]
pub fn json_coordinate(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => parse_coordinate(s),
        _ => None,
    }
}

/// Renders a scalar JSON value as text. Arrays, objects and `null` have no
/// text form.
#[must_use]
pub fn json_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Title-cases `s`: the first letter of every run of letters is upper-cased
/// and the rest lower-cased. Any non-letter starts a new run, so
/// `"d'água"` becomes `"D'Água"`.
#[must_use]
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Trims and title-cases a text field. Empty results become `None`.
#[must_use]
pub fn clean_text(s: &str) -> Option<String> {
    let cleaned = title_case(s.trim());
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Trims a cell, mapping empty cells to `None`.
#[must_use]
pub fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Normalizes a column header: trimmed, lower-cased, spaces replaced with
/// underscores.
#[must_use]
pub fn normalize_column_name(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_datetime_with_fractional() {
        let dt = parse_datetime("2024-01-15T14:30:00.000").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 14:30:00");
    }

    #[test]
    fn parses_space_separated_datetime() {
        let dt = parse_datetime("2024-01-15 08:05:00").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 08:05:00");
    }

    #[test]
    fn parses_rfc3339_keeping_wall_clock() {
        let dt = parse_datetime("2024-06-01T20:00:00-03:00").unwrap();
        assert_eq!(dt.to_string(), "2024-06-01 20:00:00");
    }

    #[test]
    fn parses_date_only_as_midnight() {
        assert_eq!(
            parse_datetime("2024-02-29").unwrap().to_string(),
            "2024-02-29 00:00:00"
        );
        assert_eq!(
            parse_datetime("05/03/2024").unwrap().to_string(),
            "2024-03-05 00:00:00"
        );
    }

    #[test]
    fn rejects_invalid_date() {
        assert!(parse_datetime("not-a-date").is_none());
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("2024-13-01").is_none());
    }

    #[test]
    fn parses_coordinates() {
        assert!((parse_coordinate("-23.5505").unwrap() - -23.5505).abs() < f64::EPSILON);
        assert!((parse_coordinate(" -46,6333 ").unwrap() - -46.6333).abs() < f64::EPSILON);
        assert!(parse_coordinate("").is_none());
        assert!(parse_coordinate("abc").is_none());
        assert!(parse_coordinate("NaN").is_none());
    }

    #[test]
    fn coerces_json_coordinates() {
        assert!(json_coordinate(&serde_json::json!(-23.5)).is_some());
        assert!(json_coordinate(&serde_json::json!("-23.5")).is_some());
        assert!(json_coordinate(&serde_json::json!("n/a")).is_none());
        assert!(json_coordinate(&serde_json::Value::Null).is_none());
    }

    #[test]
    fn title_cases_like_words() {
        assert_eq!(title_case("VILA MADALENA"), "Vila Madalena");
        assert_eq!(title_case("são paulo"), "São Paulo");
        assert_eq!(title_case("olho d'água"), "Olho D'Água");
        assert_eq!(title_case("festa junina 2024"), "Festa Junina 2024");
    }

    #[test]
    fn clean_text_maps_blank_to_none() {
        assert_eq!(clean_text("  rock in rio "), Some("Rock In Rio".to_string()));
        assert_eq!(clean_text("   "), None);
        assert_eq!(clean_text(""), None);
    }

    #[test]
    fn normalizes_headers() {
        assert_eq!(normalize_column_name(" Data Ocorrencia BO"), "data_ocorrencia_bo");
        assert_eq!(normalize_column_name("LATITUDE"), "latitude");
    }
}
