#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Occurrence and event record types for the crime dashboard.
//!
//! Both datasets are normalized once at startup into these records and
//! never mutated afterwards. The dashboard pipeline only ever reads them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// City label attached to every occurrence (the criminal dataset covers a
/// single city).
pub const OCCURRENCE_CITY: &str = "São Paulo";

/// Month names indexed by `month - 1`.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Returns the display name for a month number in `1..=12`.
#[must_use]
pub fn month_name(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(idx).copied()
}

/// Geographic zone of the metropolitan area a neighborhood belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Region {
    /// Zona Norte
    ZoneNorth,
    /// Zona Sul
    ZoneSouth,
    /// Zona Leste
    ZoneEast,
    /// Zona Oeste
    ZoneWest,
    /// Centro
    Center,
    /// Any neighborhood not listed in a named zone
    #[default]
    Other,
}

impl Region {
    /// Human-readable label shown in filter controls.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ZoneNorth => "Zone North",
            Self::ZoneSouth => "Zone South",
            Self::ZoneEast => "Zone East",
            Self::ZoneWest => "Zone West",
            Self::Center => "Center",
            Self::Other => "Other Region",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::ZoneNorth,
            Self::ZoneSouth,
            Self::ZoneEast,
            Self::ZoneWest,
            Self::Center,
            Self::Other,
        ]
    }
}

/// One police-reported criminal occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceRecord {
    /// Latitude (WGS84). `None` when the source cell is empty or not numeric.
    pub latitude: Option<f64>,
    /// Longitude (WGS84). `None` when the source cell is empty or not numeric.
    pub longitude: Option<f64>,
    /// Neighborhood (`bairro`) as written in the source.
    pub neighborhood: Option<String>,
    /// Nature of the occurrence (`natureza_apurada`).
    pub category: Option<String>,
    /// When the occurrence happened.
    pub occurred_at: NaiveDateTime,
    /// Year of `occurred_at`.
    pub year: i32,
    /// Month of `occurred_at` (1-12).
    pub month: u32,
    /// Display name of `month`.
    pub month_name: String,
    /// Hour of day (0-23). Zero doubles as "unknown" for this dataset.
    pub hour: u8,
    /// Always [`OCCURRENCE_CITY`].
    pub city: String,
    /// Zone derived from `neighborhood`.
    pub region: Region,
}

/// One scheduled public event joined with its venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Neighborhood, trimmed and title-cased.
    pub neighborhood: Option<String>,
    /// City, trimmed and title-cased.
    pub city: Option<String>,
    /// Event name, trimmed and title-cased.
    pub event_name: Option<String>,
    /// Venue number (`numero_local`).
    pub venue_number: Option<String>,
    /// Venue name.
    pub venue_name: Option<String>,
    /// Venue street address.
    pub venue_address: Option<String>,
    /// Scheduled start of the event.
    pub event_at: NaiveDateTime,
    /// Year of `event_at`.
    pub year: i32,
    /// Month of `event_at` (1-12).
    pub month: u32,
    /// Display name of `month`.
    pub month_name: String,
    /// Hour of `event_at` (0-23).
    pub hour: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_names_cover_calendar() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn region_key_roundtrip() {
        for region in Region::all() {
            let key = region.to_string();
            assert_eq!(key.parse::<Region>().unwrap(), *region);
        }
        assert_eq!(Region::ZoneNorth.as_ref(), "zone_north");
        assert_eq!(Region::Other.label(), "Other Region");
    }
}
