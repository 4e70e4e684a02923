//! Event and venue loader.
//!
//! Events reference venues through `local_id`. The two JSON arrays are
//! left-joined on that key, and rows without usable coordinates or an
//! event date are dropped.

use std::collections::HashMap;
use std::path::Path;

use chrono::{Datelike as _, Timelike as _};
use crime_dashboard_dataset_models::{EventRecord, month_name};
use serde::Serialize;
use serde_json::Value;

use crate::DatasetError;
use crate::parsing::{clean_text, json_coordinate, json_text, non_empty, parse_datetime};

/// Diagnostics collected while loading events and venues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLoadReport {
    /// Entries in the events array.
    pub events_read: usize,
    /// Entries in the venues array.
    pub venues_read: usize,
    /// Events whose `local_id` matched no venue.
    pub unmatched_venue: usize,
    /// Joined rows dropped for missing or non-numeric coordinates.
    pub dropped_bad_coordinates: usize,
    /// Joined rows dropped because `data_evento` did not parse.
    pub dropped_bad_date: usize,
}

impl EventLoadReport {
    /// Logs the report, warning when rows were dropped.
    pub fn log(&self) {
        log::info!(
            "Events: {} events and {} venues read",
            self.events_read,
            self.venues_read
        );
        if self.unmatched_venue > 0 {
            log::warn!(
                "Events: {} events reference no known venue",
                self.unmatched_venue
            );
        }
        if self.dropped_bad_coordinates > 0 {
            log::warn!(
                "Events: dropped {} rows without usable coordinates",
                self.dropped_bad_coordinates
            );
        }
        if self.dropped_bad_date > 0 {
            log::warn!(
                "Events: dropped {} rows with unparseable dates",
                self.dropped_bad_date
            );
        }
    }
}

/// Reads both JSON arrays and joins them into event records.
///
/// # Errors
///
/// Returns [`DatasetError`] if either file cannot be read, is not valid
/// JSON, or does not hold a JSON array.
pub fn load_events(
    events_path: &Path,
    venues_path: &Path,
) -> Result<(Vec<EventRecord>, EventLoadReport), DatasetError> {
    let events = read_json_array(events_path)?;
    let venues = read_json_array(venues_path)?;
    Ok(normalize_events(&events, &venues))
}

fn read_json_array(path: &Path) -> Result<Vec<Value>, DatasetError> {
    let data = std::fs::read(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_slice(&data).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(DatasetError::NotAnArray {
            path: path.to_path_buf(),
        }),
    }
}

/// Canonical join key for a venue id. Integral numbers and numeric
/// strings compare equal (`1`, `1.0` and `"1"` are the same venue).
fn join_key(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_f64().map(format_float_key)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else if let Ok(f) = s.parse::<f64>() {
                Some(format_float_key(f))
            } else {
                Some(s.to_string())
            }
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn format_float_key(f: f64) -> String {
    if f.fract().abs() < f64::EPSILON && f.abs() < 9.0e15 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

/// First non-null value for `key`, looking at the event before the venue.
fn lookup<'a>(event: &'a Value, venue: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    event
        .get(key)
        .filter(|v| !v.is_null())
        .or_else(|| venue.and_then(|v| v.get(key)).filter(|v| !v.is_null()))
}

fn venue_text(venue: Option<&Value>, key: &str) -> Option<String> {
    venue
        .and_then(|v| v.get(key))
        .and_then(json_text)
        .and_then(|s| non_empty(&s))
}

fn clean_field(event: &Value, venue: Option<&Value>, key: &str) -> Option<String> {
    lookup(event, venue, key)
        .and_then(json_text)
        .and_then(|s| clean_text(&s))
}

/// Joins events to venues and normalizes the result.
///
/// Every event yields one candidate row per matching venue, or a single
/// row without venue fields when nothing matches. Coordinates come from
/// the venue, falling back to the event itself.
#[must_use]
pub fn normalize_events(events: &[Value], venues: &[Value]) -> (Vec<EventRecord>, EventLoadReport) {
    let mut report = EventLoadReport {
        events_read: events.len(),
        venues_read: venues.len(),
        ..EventLoadReport::default()
    };

    let mut venue_index: HashMap<String, Vec<&Value>> = HashMap::new();
    for venue in venues {
        if let Some(key) = venue.get("id").and_then(join_key) {
            venue_index.entry(key).or_default().push(venue);
        }
    }

    let mut records = Vec::new();
    for event in events {
        let matches: Vec<Option<&Value>> = event
            .get("local_id")
            .and_then(join_key)
            .and_then(|key| venue_index.get(&key))
            .map_or_else(
                || vec![None],
                |found| found.iter().copied().map(Some).collect(),
            );
        if matches == [None] {
            report.unmatched_venue += 1;
        }

        for venue in matches {
            let coordinate = |key: &str| {
                venue
                    .and_then(|v| v.get(key))
                    .and_then(json_coordinate)
                    .or_else(|| event.get(key).and_then(json_coordinate))
            };
            let (Some(latitude), Some(longitude)) = (coordinate("latitude"), coordinate("longitude"))
            else {
                report.dropped_bad_coordinates += 1;
                continue;
            };

            let Some(event_at) = event
                .get("data_evento")
                .and_then(json_text)
                .and_then(|s| parse_datetime(&s))
            else {
                report.dropped_bad_date += 1;
                continue;
            };

            let month = event_at.month();
            records.push(EventRecord {
                latitude,
                longitude,
                neighborhood: clean_field(event, venue, "bairro"),
                city: clean_field(event, venue, "cidade"),
                event_name: clean_field(event, venue, "evento_nome"),
                venue_number: venue_text(venue, "numero_local"),
                venue_name: venue_text(venue, "nome"),
                venue_address: venue_text(venue, "endereco"),
                event_at,
                year: event_at.year(),
                month,
                month_name: month_name(month).unwrap_or_default().to_string(),
                hour: u8::try_from(event_at.hour()).unwrap_or(0),
            });
        }
    }

    (records, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn venues() -> Vec<Value> {
        vec![
            json!({
                "id": 1,
                "numero_local": 10,
                "nome": "Allianz Parque",
                "endereco": "Av. Francisco Matarazzo, 1705",
                "bairro": "água branca",
                "cidade": "são paulo",
                "latitude": -23.5275,
                "longitude": "-46.6780"
            }),
            json!({
                "id": "2",
                "nome": "Ibirapuera",
                "bairro": "  ",
                "cidade": "SÃO PAULO",
                "latitude": -23.5874,
                "longitude": -46.6576
            }),
        ]
    }

    #[test]
    fn joins_and_normalizes() {
        let events = vec![json!({
            "local_id": 1,
            "evento_nome": "  festival de jazz ",
            "data_evento": "2024-06-01T20:30:00"
        })];
        let (records, report) = normalize_events(&events, &venues());
        assert_eq!(records.len(), 1);
        let e = &records[0];
        assert_eq!(e.event_name.as_deref(), Some("Festival De Jazz"));
        assert_eq!(e.neighborhood.as_deref(), Some("Água Branca"));
        assert_eq!(e.city.as_deref(), Some("São Paulo"));
        assert_eq!(e.venue_number.as_deref(), Some("10"));
        assert_eq!(e.venue_name.as_deref(), Some("Allianz Parque"));
        assert_eq!(e.venue_address.as_deref(), Some("Av. Francisco Matarazzo, 1705"));
        assert!((e.longitude - -46.678).abs() < 1e-9);
        assert_eq!((e.year, e.month, e.hour), (2024, 6, 20));
        assert_eq!(e.month_name, "June");
        assert_eq!(report.unmatched_venue, 0);
    }

    #[test]
    fn empty_neighborhood_is_absent() {
        let events = vec![json!({
            "local_id": 2.0,
            "evento_nome": "corrida",
            "data_evento": "2024-04-07 07:00:00"
        })];
        let (records, _) = normalize_events(&events, &venues());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].neighborhood, None);
        assert_eq!(records[0].hour, 7);
    }

    #[test]
    fn event_fields_take_precedence_over_venue() {
        let events = vec![json!({
            "local_id": 1,
            "bairro": "pompeia",
            "evento_nome": "show",
            "data_evento": "2024-06-01T20:30:00"
        })];
        let (records, _) = normalize_events(&events, &venues());
        assert_eq!(records[0].neighborhood.as_deref(), Some("Pompeia"));
    }

    #[test]
    fn drops_rows_without_coordinates_or_date() {
        let events = vec![
            json!({"local_id": 99, "evento_nome": "sem local", "data_evento": "2024-01-01T10:00:00"}),
            json!({"local_id": 1, "evento_nome": "sem data", "data_evento": "amanhã"}),
            json!({"evento_nome": "coordenadas proprias", "latitude": "-23.5", "longitude": -46.6,
                   "data_evento": "2024-02-02T00:15:00"}),
        ];
        let (records, report) = normalize_events(&events, &venues());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event_name.as_deref(), Some("Coordenadas Proprias"));
        assert_eq!(records[0].hour, 0);
        assert_eq!(records[0].venue_name, None);
        assert_eq!(
            report,
            EventLoadReport {
                events_read: 3,
                venues_read: 2,
                unmatched_venue: 2,
                dropped_bad_coordinates: 1,
                dropped_bad_date: 1,
            }
        );
    }

    #[test]
    fn duplicate_venue_ids_yield_one_row_each() {
        let venues = vec![
            json!({"id": 5, "nome": "A", "latitude": -23.1, "longitude": -46.1}),
            json!({"id": 5, "nome": "B", "latitude": -23.2, "longitude": -46.2}),
        ];
        let events = vec![json!({"local_id": "5", "data_evento": "2024-03-03T12:00:00"})];
        let (records, _) = normalize_events(&events, &venues);
        let names: Vec<_> = records.iter().map(|r| r.venue_name.as_deref()).collect();
        assert_eq!(names, vec![Some("A"), Some("B")]);
    }

    #[test]
    fn normalization_is_deterministic() {
        let events = vec![
            json!({"local_id": 1, "evento_nome": "show", "data_evento": "2024-06-01T20:30:00"}),
            json!({"local_id": "2", "bairro": "moema", "data_evento": "2024-06-02 09:00"}),
            json!({"local_id": 99, "evento_nome": "sem local", "data_evento": "2024-01-01T10:00:00"}),
        ];
        let venues = venues();
        assert_eq!(
            normalize_events(&events, &venues),
            normalize_events(&events, &venues)
        );
    }

    #[test]
    fn rejects_non_array_json() {
        let dir = std::env::temp_dir().join("crime_dashboard_events_not_array");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let events = dir.join("events.json");
        let venues = dir.join("venues.json");
        std::fs::write(&events, r#"{"events": []}"#).unwrap();
        std::fs::write(&venues, "[]").unwrap();

        let err = load_events(&events, &venues).unwrap_err();
        assert!(matches!(err, DatasetError::NotAnArray { .. }));

        std::fs::write(&events, "[not json").unwrap();
        let err = load_events(&events, &venues).unwrap_err();
        assert!(matches!(err, DatasetError::Json { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
