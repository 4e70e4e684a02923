#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter selection and dashboard payload types.
//!
//! [`FilterSelection`] is deserialized from the update request's query
//! string; [`FilterOptions`] and [`DashboardUpdate`] are serialized to JSON
//! for the browser, which renders them with its charting library.

use crime_dashboard_dataset_models::Region;
use serde::{Deserialize, Serialize};

/// The current value of every filter control. `None` leaves the dimension
/// unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    /// Month number (1-12). Applies to both datasets.
    pub month: Option<u32>,
    /// Zone. Applies to occurrences only.
    pub region: Option<Region>,
    /// City. Applies to both datasets.
    pub city: Option<String>,
    /// Neighborhood. Applies to both datasets.
    pub neighborhood: Option<String>,
    /// Occurrence nature. Applies to occurrences only.
    pub category: Option<String>,
    /// Event name. Applies to events only.
    pub event_name: Option<String>,
    /// Hour of day (0-23). Applies to both datasets.
    pub hour: Option<u8>,
}

/// One entry of a dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption<T> {
    /// Text shown to the user.
    pub label: String,
    /// Value submitted when selected.
    pub value: T,
}

impl<T> SelectOption<T> {
    /// Creates an option.
    pub fn new(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Selectable values for every filter control, computed once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Months present in either dataset, in calendar order.
    pub months: Vec<SelectOption<u32>>,
    /// Zones present in the occurrence dataset.
    pub regions: Vec<SelectOption<Region>>,
    /// Cities from both datasets.
    pub cities: Vec<SelectOption<String>>,
    /// Neighborhoods from both datasets.
    pub neighborhoods: Vec<SelectOption<String>>,
    /// Occurrence natures.
    pub categories: Vec<SelectOption<String>>,
    /// Event names.
    pub event_names: Vec<SelectOption<String>>,
    /// Every hour of the day, labelled `HH:00`.
    pub hours: Vec<SelectOption<u8>>,
}

/// A single aggregated map point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityPoint {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Number of records at exactly this coordinate.
    pub count: u64,
}

/// Map center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapCenter {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

/// A density (heat) map and its view settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityMap {
    /// Aggregated points, sorted by latitude then longitude.
    pub points: Vec<DensityPoint>,
    /// Initial map center.
    pub center: MapCenter,
    /// Initial zoom level.
    pub zoom: u8,
    /// Heat radius of each point, in pixels.
    pub radius: u8,
    /// Layer opacity (0-1).
    pub opacity: f64,
}

/// What a map slot shows: a density map, or a message when nothing
/// matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapFigure {
    /// A rendered density map.
    Density(DensityMap),
    /// A text annotation in place of the map.
    Placeholder {
        /// Message to show.
        message: String,
    },
}

impl MapFigure {
    /// Returns `true` if this is a placeholder.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }
}

/// Row count for one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourCount {
    /// Hour of day (0-23).
    pub hour: u8,
    /// Matching rows.
    pub count: u64,
}

/// Zero-filled hourly distribution over a fixed range of hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourHistogram {
    /// Chart title.
    pub title: String,
    /// Y-axis label.
    pub y_label: String,
    /// One bucket per hour, ascending.
    pub buckets: Vec<HourCount>,
}

/// A labelled summary value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCard {
    /// Caption under the value.
    pub label: String,
    /// Formatted value.
    pub value: String,
}

impl SummaryCard {
    /// Creates a card.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Everything the dashboard re-renders after a filter change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardUpdate {
    /// Occurrence density map.
    pub occurrence_map: MapFigure,
    /// Occurrences per hour, hours 1-23.
    pub occurrence_hours: HourHistogram,
    /// Occurrence total, excluding hour 0.
    pub occurrence_total: SummaryCard,
    /// Most frequent occurrence hour.
    pub occurrence_peak_hour: SummaryCard,
    /// Most frequent occurrence nature.
    pub top_category: SummaryCard,
    /// Event density map.
    pub event_map: MapFigure,
    /// Events per hour, hours 0-23.
    pub event_hours: HourHistogram,
    /// Most frequent event name.
    pub top_event: SummaryCard,
    /// Most frequent event hour.
    pub event_peak_hour: SummaryCard,
    /// Event total.
    pub event_total: SummaryCard,
}
