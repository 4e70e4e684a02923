//! Selectable values for the filter controls.

use std::collections::BTreeSet;

use crime_dashboard_analytics_models::{FilterOptions, SelectOption};
use crime_dashboard_dataset_models::{EventRecord, OccurrenceRecord, Region, month_name};

use crate::pipeline::format_hour;

fn text_options<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<SelectOption<String>> {
    values
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|v| SelectOption::new(v, v.to_string()))
        .collect()
}

/// Builds the sorted, distinct options for every filter control.
///
/// Neighborhoods, cities and months are the union over both datasets.
/// Month filters both tables, so a month that only events have is still
/// offered. Regions and categories come from occurrences only, event names
/// from events only. Absent values never become options.
#[must_use]
pub fn build_filter_options(
    occurrences: &[OccurrenceRecord],
    events: &[EventRecord],
) -> FilterOptions {
    let months: BTreeSet<u32> = occurrences
        .iter()
        .map(|o| o.month)
        .chain(events.iter().map(|e| e.month))
        .collect();
    let regions: BTreeSet<Region> = occurrences.iter().map(|o| o.region).collect();

    FilterOptions {
        months: months
            .into_iter()
            .filter_map(|m| month_name(m).map(|name| SelectOption::new(name, m)))
            .collect(),
        regions: regions
            .into_iter()
            .map(|r| SelectOption::new(r.label(), r))
            .collect(),
        cities: text_options(
            occurrences
                .iter()
                .map(|o| o.city.as_str())
                .chain(events.iter().filter_map(|e| e.city.as_deref())),
        ),
        neighborhoods: text_options(
            occurrences
                .iter()
                .filter_map(|o| o.neighborhood.as_deref())
                .chain(events.iter().filter_map(|e| e.neighborhood.as_deref())),
        ),
        categories: text_options(occurrences.iter().filter_map(|o| o.category.as_deref())),
        event_names: text_options(events.iter().filter_map(|e| e.event_name.as_deref())),
        hours: (0..=23).map(|h| SelectOption::new(format_hour(h), h)).collect(),
    }
}
