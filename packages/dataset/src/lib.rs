#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loading and normalization of the occurrence and event datasets.
//!
//! Both sources are read once at startup. Rows that cannot be normalized
//! (bad dates, bad coordinates) are dropped, and the number of dropped or
//! defaulted rows is reported back in a load report so the caller can log
//! it. Any failure to read a source file is fatal.

pub mod config;
pub mod criminal;
pub mod events;
pub mod hour;
pub mod parsing;
pub mod table;
pub mod zones;

use std::path::PathBuf;

use crime_dashboard_dataset_models::{EventRecord, OccurrenceRecord};

use crate::config::DataPaths;
use crate::criminal::OccurrenceLoadReport;
use crate::events::EventLoadReport;
use crate::zones::ZoneTable;

/// Errors that can occur while loading the datasets.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// A source file could not be opened or read.
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The delimited occurrence table could not be read.
    #[error("Failed to read occurrence table: {0}")]
    Csv(#[from] csv::Error),

    /// The occurrence workbook could not be opened or read.
    #[error("Failed to read occurrence workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// The occurrence workbook contains no worksheet.
    #[error("Occurrence workbook has no worksheets")]
    EmptyWorkbook,

    /// A JSON source could not be parsed.
    #[error("JSON parse error in '{}': {source}", .path.display())]
    Json {
        /// File that failed.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// A JSON source did not contain an array of records.
    #[error("Expected a JSON array of objects in '{}'", .path.display())]
    NotAnArray {
        /// File that failed.
        path: PathBuf,
    },

    /// None of the accepted column names were present.
    #[error("Missing column: expected one of {}", .candidates.join(", "))]
    MissingColumn {
        /// Column names that were tried, in preference order.
        candidates: Vec<String>,
    },

    /// The embedded zone table is malformed.
    #[error("Zone table error: {0}")]
    ZoneTable(#[from] toml::de::Error),
}

/// Both normalized datasets plus their load reports.
#[derive(Debug, Clone)]
pub struct Datasets {
    /// Criminal occurrences.
    pub occurrences: Vec<OccurrenceRecord>,
    /// Events joined with their venues.
    pub events: Vec<EventRecord>,
    /// Diagnostics from loading the occurrence table.
    pub occurrence_report: OccurrenceLoadReport,
    /// Diagnostics from loading the events and venues.
    pub event_report: EventLoadReport,
}

/// Loads and normalizes both datasets from the given paths.
///
/// # Errors
///
/// Returns [`DatasetError`] if any source file is missing or unreadable,
/// if the occurrence table has no date column, or if the embedded zone
/// table fails to parse.
pub fn load_all(paths: &DataPaths) -> Result<Datasets, DatasetError> {
    let zones = ZoneTable::embedded()?;

    log::info!(
        "Loading occurrences from {}...",
        paths.criminal_file.display()
    );
    let (occurrences, occurrence_report) =
        criminal::load_occurrences(&paths.criminal_file, &zones)?;
    log::info!(
        "Loaded {} occurrences from '{}'",
        occurrences.len(),
        paths.criminal_file.display()
    );
    occurrence_report.log();

    log::info!(
        "Loading events from {} and venues from {}...",
        paths.events_file.display(),
        paths.venues_file.display()
    );
    let (events, event_report) = events::load_events(&paths.events_file, &paths.venues_file)?;
    log::info!("Loaded {} events", events.len());
    event_report.log();

    Ok(Datasets {
        occurrences,
        events,
        occurrence_report,
        event_report,
    })
}
