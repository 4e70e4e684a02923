//! Typed cells for the tabular occurrence source.
//!
//! The occurrence table arrives either as a delimited text export or as a
//! spreadsheet workbook. Both are read into a [`Table`] of [`Cell`]s so the
//! normalizer sees one shape: text exports yield only text cells, while
//! workbooks keep their numbers, datetimes and durations typed.

use std::io::Cursor;

use calamine::{Data, DataType as _, Reader as _};
use chrono::{NaiveDateTime, TimeDelta, Timelike as _};

use crate::DatasetError;
use crate::hour::RawHour;
use crate::parsing::{non_empty, normalize_column_name, parse_coordinate, parse_datetime};

/// One cell of the occurrence table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// No value.
    Empty,
    /// Text, including every cell of a delimited export.
    Text(String),
    /// An untyped spreadsheet number.
    Number(f64),
    /// A spreadsheet date or datetime.
    Timestamp(NaiveDateTime),
    /// A spreadsheet duration or a time of day without a date.
    Duration(TimeDelta),
}

/// Renders a spreadsheet number the way it reads in a cell: whole numbers
/// without a fractional part.
#[allow(clippy::cast_possible_truncation)]
fn number_text(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON && value.abs() < 1e15 {
        return (value as i64).to_string();
    }
    value.to_string()
}

impl Cell {
    /// Trimmed text content, `None` when empty.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) => non_empty(s),
            Self::Number(n) => Some(number_text(*n)),
            Self::Timestamp(dt) => Some(dt.to_string()),
            Self::Duration(delta) => Some(delta.to_string()),
        }
    }

    /// The cell as a date or datetime.
    #[must_use]
    pub fn datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Timestamp(dt) => Some(*dt),
            Self::Text(s) => parse_datetime(s),
            Self::Empty | Self::Number(_) | Self::Duration(_) => None,
        }
    }

    /// The cell as a finite coordinate.
    #[must_use]
    pub fn coordinate(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.is_finite().then_some(*n),
            Self::Text(s) => parse_coordinate(s),
            Self::Empty | Self::Timestamp(_) | Self::Duration(_) => None,
        }
    }

    /// The cell as a raw time-of-day value for hour extraction.
    #[must_use]
    pub fn raw_hour(&self) -> Option<RawHour> {
        match self {
            Self::Empty => None,
            Self::Text(s) => Some(RawHour::from_cell(s)),
            Self::Number(n) => Some(RawHour::Text(number_text(*n))),
            Self::Timestamp(dt) => Some(RawHour::Timestamp(*dt)),
            Self::Duration(delta) => Some(RawHour::Duration(*delta)),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Self::Empty,
            Data::String(s) => Self::Text(s.clone()),
            Data::Int(i) => Self::Text(i.to_string()),
            Data::Float(f) => Self::Number(*f),
            Data::Bool(b) => Self::Text(b.to_string()),
            Data::DateTime(dt) if dt.is_duration() => {
                dt.as_duration().map_or(Self::Empty, Self::Duration)
            }
            Data::DateTime(dt) => dt.as_datetime().map_or(Self::Empty, Self::Timestamp),
            Data::DateTimeIso(s) => data
                .as_datetime()
                .map(Self::Timestamp)
                .or_else(|| {
                    data.as_time()
                        .and_then(|t| TimeDelta::try_seconds(i64::from(t.num_seconds_from_midnight())))
                        .map(Self::Duration)
                })
                .unwrap_or_else(|| Self::Text(s.clone())),
            Data::DurationIso(s) => data
                .as_duration()
                .map_or_else(|| Self::Text(s.clone()), Self::Duration),
        }
    }
}

/// A header row plus data rows. Rows may be shorter than the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Normalized column names (see [`normalize_column_name`]).
    pub headers: Vec<String>,
    /// Data rows.
    pub rows: Vec<Vec<Cell>>,
    /// Rows that held bytes outside UTF-8; those bytes were replaced.
    pub lossy_rows: usize,
}

impl Table {
    /// Position of a normalized column name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Picks `;` when the header line has more semicolons than commas.
fn detect_delimiter(data: &[u8]) -> u8 {
    let header = data.split(|b| *b == b'\n').next().unwrap_or_default();
    let semicolons = header.iter().filter(|b| **b == b';').count();
    let commas = header.iter().filter(|b| **b == b',').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Reads a `,` or `;` delimited export. Every cell becomes [`Cell::Text`].
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the
/// load; affected rows are counted in [`Table::lossy_rows`].
///
/// # Errors
///
/// Returns [`DatasetError::Csv`] if the reader fails.
pub fn read_csv(data: &[u8]) -> Result<Table, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(data))
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .byte_headers()?
        .iter()
        .map(|h| normalize_column_name(&String::from_utf8_lossy(h)))
        .collect();

    let mut table = Table {
        headers,
        ..Table::default()
    };
    for result in reader.byte_records() {
        let record = result?;
        if std::str::from_utf8(record.as_slice()).is_err() {
            table.lossy_rows += 1;
        }
        table.rows.push(
            record
                .iter()
                .map(|field| Cell::Text(String::from_utf8_lossy(field).into_owned()))
                .collect(),
        );
    }
    Ok(table)
}

/// Reads the first worksheet of a workbook (xlsx, xlsm, xlsb, xls or ods).
/// The first row is the header.
///
/// # Errors
///
/// Returns [`DatasetError::Workbook`] if the bytes are not a readable
/// workbook, or [`DatasetError::EmptyWorkbook`] if it has no worksheet.
pub fn read_workbook(data: &[u8]) -> Result<Table, DatasetError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(data))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DatasetError::EmptyWorkbook)??;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| {
            row.iter()
                .map(|cell| normalize_column_name(&cell.to_string()))
                .collect()
        })
        .unwrap_or_default();

    Ok(Table {
        headers,
        rows: rows.map(|row| row.iter().map(Cell::from).collect()).collect(),
        lossy_rows: 0,
    })
}
