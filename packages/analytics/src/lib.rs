#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filtering and aggregation engine for the dashboard.
//!
//! A [`Dashboard`] owns the two loaded datasets and the filter options
//! derived from them. Each call to [`Dashboard::update`] filters both
//! datasets and rebuilds every map, histogram and summary card from
//! scratch; the datasets themselves are never modified.

pub mod options;
pub mod pipeline;

use crime_dashboard_analytics_models::{DashboardUpdate, FilterOptions, FilterSelection};
use crime_dashboard_dataset_models::{EventRecord, OccurrenceRecord};

/// Read-only dashboard context: both datasets plus their filter options.
#[derive(Debug, Clone)]
pub struct Dashboard {
    occurrences: Vec<OccurrenceRecord>,
    events: Vec<EventRecord>,
    options: FilterOptions,
}

impl Dashboard {
    /// Takes ownership of the loaded datasets and computes the filter
    /// options once.
    #[must_use]
    pub fn new(occurrences: Vec<OccurrenceRecord>, events: Vec<EventRecord>) -> Self {
        let options = options::build_filter_options(&occurrences, &events);
        log::info!(
            "Dashboard ready: {} occurrences, {} events, {} neighborhoods, {} categories, {} event names",
            occurrences.len(),
            events.len(),
            options.neighborhoods.len(),
            options.categories.len(),
            options.event_names.len()
        );
        Self {
            occurrences,
            events,
            options,
        }
    }

    /// Filter options computed at construction.
    #[must_use]
    pub const fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// All loaded occurrences.
    #[must_use]
    pub fn occurrences(&self) -> &[OccurrenceRecord] {
        &self.occurrences
    }

    /// All loaded events.
    #[must_use]
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Builds the dashboard for one filter selection.
    #[must_use]
    pub fn update(&self, selection: &FilterSelection) -> DashboardUpdate {
        pipeline::build_update(&self.occurrences, &self.events, selection)
    }
}
