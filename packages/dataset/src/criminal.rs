//! Criminal occurrence table loader.
//!
//! Reads the occurrence table from a spreadsheet workbook or a delimited
//! text export, normalizes its column names, drops rows whose date cannot
//! be parsed, and derives the calendar, hour, city and region fields of
//! each [`OccurrenceRecord`].

use std::path::Path;

use chrono::{Datelike as _, NaiveDateTime};
use crime_dashboard_dataset_models::{OCCURRENCE_CITY, OccurrenceRecord, month_name};
use serde::Serialize;

use crate::DatasetError;
use crate::hour::{RawHour, count_defaulted, extract_hours};
use crate::table::{Cell, Table, read_csv, read_workbook};
use crate::zones::ZoneTable;

/// Date column names, in preference order.
pub const DATE_COLUMNS: &[&str] = &["data_ocorrencia_bo", "dataocorrencia"];
/// Free-form time-of-day column.
pub const HOUR_COLUMN: &str = "hora_ocorrencia_bo";
/// Neighborhood column.
pub const NEIGHBORHOOD_COLUMN: &str = "bairro";
/// Occurrence nature column.
pub const CATEGORY_COLUMN: &str = "natureza_apurada";
/// Latitude column.
pub const LATITUDE_COLUMN: &str = "latitude";
/// Longitude column.
pub const LONGITUDE_COLUMN: &str = "longitude";

/// File extensions read as spreadsheet workbooks. Anything else is read as
/// delimited text.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Diagnostics collected while loading the occurrence table.
///
/// None of these change the loaded data; they exist so that silently
/// dropped or defaulted rows show up in the startup log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceLoadReport {
    /// Data rows read from the file.
    pub rows_read: usize,
    /// Rows dropped because the date did not parse.
    pub dropped_bad_date: usize,
    /// Kept rows whose hour defaulted to 0.
    pub defaulted_hour: usize,
    /// Kept rows whose neighborhood is not in any zone.
    pub defaulted_region: usize,
    /// Kept rows without usable coordinates (absent from the map).
    pub missing_coordinates: usize,
    /// Rows of a text export holding bytes outside UTF-8, which were
    /// replaced with U+FFFD.
    pub lossy_text_rows: usize,
}

impl OccurrenceLoadReport {
    /// Logs the report, warning when rows were dropped or defaulted.
    pub fn log(&self) {
        log::info!(
            "Occurrences: {} rows read, {} kept",
            self.rows_read,
            self.rows_read - self.dropped_bad_date
        );
        if self.dropped_bad_date > 0 {
            log::warn!(
                "Occurrences: dropped {} rows with unparseable dates",
                self.dropped_bad_date
            );
        }
        if self.defaulted_hour > 0 {
            log::warn!(
                "Occurrences: {} rows have no usable hour and were assigned hour 0",
                self.defaulted_hour
            );
        }
        if self.defaulted_region > 0 {
            log::warn!(
                "Occurrences: {} rows have a neighborhood outside every zone",
                self.defaulted_region
            );
        }
        if self.missing_coordinates > 0 {
            log::warn!(
                "Occurrences: {} rows have no coordinates and are left off the map",
                self.missing_coordinates
            );
        }
        if self.lossy_text_rows > 0 {
            log::warn!(
                "Occurrences: {} rows contain bytes that are not UTF-8; they were replaced",
                self.lossy_text_rows
            );
        }
    }
}

/// Whether `path` names a spreadsheet workbook, by extension.
#[must_use]
pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}

/// Reads and normalizes the occurrence table at `path`. Workbooks are
/// recognized by extension (see [`WORKBOOK_EXTENSIONS`]); any other file is
/// read as delimited text.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read, is not a readable
/// workbook or delimited file, or has no recognizable date column.
pub fn load_occurrences(
    path: &Path,
    zones: &ZoneTable,
) -> Result<(Vec<OccurrenceRecord>, OccurrenceLoadReport), DatasetError> {
    let data = std::fs::read(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if is_workbook(path) {
        normalize_workbook(&data, zones)
    } else {
        normalize_occurrences(&data, zones)
    }
}

/// Normalizes raw delimited-text bytes into occurrence records.
///
/// # Errors
///
/// Returns [`DatasetError`] if the data is not readable as delimited text
/// or has no recognizable date column.
pub fn normalize_occurrences(
    data: &[u8],
    zones: &ZoneTable,
) -> Result<(Vec<OccurrenceRecord>, OccurrenceLoadReport), DatasetError> {
    normalize_table(&read_csv(data)?, zones)
}

/// Normalizes the first worksheet of raw workbook bytes into occurrence
/// records.
///
/// # Errors
///
/// Returns [`DatasetError`] if the data is not a readable workbook or has
/// no recognizable date column.
pub fn normalize_workbook(
    data: &[u8],
    zones: &ZoneTable,
) -> Result<(Vec<OccurrenceRecord>, OccurrenceLoadReport), DatasetError> {
    normalize_table(&read_workbook(data)?, zones)
}

/// A row that survived date parsing, before hour extraction.
struct PendingRow {
    occurred_at: NaiveDateTime,
    latitude: Option<f64>,
    longitude: Option<f64>,
    neighborhood: Option<String>,
    category: Option<String>,
}

fn normalize_table(
    table: &Table,
    zones: &ZoneTable,
) -> Result<(Vec<OccurrenceRecord>, OccurrenceLoadReport), DatasetError> {
    let date_idx = DATE_COLUMNS
        .iter()
        .find_map(|name| table.column(name))
        .ok_or_else(|| DatasetError::MissingColumn {
            candidates: DATE_COLUMNS.iter().map(ToString::to_string).collect(),
        })?;
    let hour_idx = table.column(HOUR_COLUMN);
    let neighborhood_idx = table.column(NEIGHBORHOOD_COLUMN);
    let category_idx = table.column(CATEGORY_COLUMN);
    let lat_idx = table.column(LATITUDE_COLUMN);
    let lng_idx = table.column(LONGITUDE_COLUMN);

    if hour_idx.is_none() {
        log::warn!("Occurrence table has no '{HOUR_COLUMN}' column; every hour defaults to 0");
    }

    let mut report = OccurrenceLoadReport {
        lossy_text_rows: table.lossy_rows,
        ..OccurrenceLoadReport::default()
    };
    let mut rows = Vec::new();
    let mut hour_cells: Vec<Option<RawHour>> = Vec::new();

    for row in &table.rows {
        report.rows_read += 1;

        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i));

        let Some(occurred_at) = row.get(date_idx).and_then(Cell::datetime) else {
            report.dropped_bad_date += 1;
            continue;
        };

        hour_cells.push(cell(hour_idx).and_then(Cell::raw_hour));
        rows.push(PendingRow {
            occurred_at,
            latitude: cell(lat_idx).and_then(Cell::coordinate),
            longitude: cell(lng_idx).and_then(Cell::coordinate),
            neighborhood: cell(neighborhood_idx).and_then(Cell::text),
            category: cell(category_idx).and_then(Cell::text),
        });
    }

    let hour_column = hour_idx.map(|_| hour_cells.as_slice());
    let hours = extract_hours(hour_column, rows.len());
    report.defaulted_hour = count_defaulted(hour_column, rows.len());

    let records = rows
        .into_iter()
        .zip(hours)
        .map(|(row, hour)| {
            let region = row.neighborhood.as_deref().and_then(|n| zones.lookup(n));
            if region.is_none() {
                report.defaulted_region += 1;
            }
            if row.latitude.is_none() || row.longitude.is_none() {
                report.missing_coordinates += 1;
            }
            let month = row.occurred_at.month();
            OccurrenceRecord {
                latitude: row.latitude,
                longitude: row.longitude,
                neighborhood: row.neighborhood,
                category: row.category,
                occurred_at: row.occurred_at,
                year: row.occurred_at.year(),
                month,
                month_name: month_name(month).unwrap_or_default().to_string(),
                hour,
                city: OCCURRENCE_CITY.to_string(),
                region: region.unwrap_or_default(),
            }
        })
        .collect();

    Ok((records, report))
}
