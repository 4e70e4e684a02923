//! Filtering and aggregation behind every dashboard update.
//!
//! All functions here are pure: they read the loaded records and build new
//! payloads, never mutating their inputs.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crime_dashboard_analytics_models::{
    DashboardUpdate, DensityMap, DensityPoint, FilterSelection, HourCount, HourHistogram,
    MapCenter, MapFigure, SummaryCard,
};
use crime_dashboard_dataset_models::{EventRecord, OccurrenceRecord};

/// Value shown on a frequency card when nothing qualifies.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder shown when no occurrence has coordinates.
pub const NO_OCCURRENCES_MESSAGE: &str = "No data found for the selected filters.";
/// Placeholder shown when no event matches.
pub const NO_EVENTS_MESSAGE: &str = "No events found for the selected filters.";

/// Hours charted for occurrences. Hour 0 doubles as "unknown" and is left
/// out.
pub const OCCURRENCE_HOURS: RangeInclusive<u8> = 1..=23;
/// Hours charted for events.
pub const EVENT_HOURS: RangeInclusive<u8> = 0..=23;

const OCCURRENCE_RADIUS: u8 = 15;
const OCCURRENCE_OPACITY: f64 = 0.8;

/// The event map always opens on central São Paulo.
pub const EVENT_MAP_CENTER: MapCenter = MapCenter {
    latitude: -23.550_520,
    longitude: -46.633_308,
};
const EVENT_ZOOM: u8 = 12;
const EVENT_RADIUS: u8 = 18;
const EVENT_OPACITY: f64 = 1.0;

fn accepts<T: PartialEq + ?Sized>(wanted: Option<&T>, actual: Option<&T>) -> bool {
    wanted.is_none_or(|w| actual == Some(w))
}

/// Returns the occurrences matching every dimension set in `selection`
/// that applies to occurrences.
#[must_use]
pub fn filter_occurrences<'a>(
    occurrences: &'a [OccurrenceRecord],
    selection: &FilterSelection,
) -> Vec<&'a OccurrenceRecord> {
    occurrences
        .iter()
        .filter(|o| {
            accepts(selection.month.as_ref(), Some(&o.month))
                && accepts(selection.city.as_deref(), Some(o.city.as_str()))
                && accepts(selection.neighborhood.as_deref(), o.neighborhood.as_deref())
                && accepts(selection.hour.as_ref(), Some(&o.hour))
                && accepts(selection.region.as_ref(), Some(&o.region))
                && accepts(selection.category.as_deref(), o.category.as_deref())
        })
        .collect()
}

/// Returns the events matching every dimension set in `selection` that
/// applies to events.
#[must_use]
pub fn filter_events<'a>(
    events: &'a [EventRecord],
    selection: &FilterSelection,
) -> Vec<&'a EventRecord> {
    events
        .iter()
        .filter(|e| {
            accepts(selection.month.as_ref(), Some(&e.month))
                && accepts(selection.city.as_deref(), e.city.as_deref())
                && accepts(selection.neighborhood.as_deref(), e.neighborhood.as_deref())
                && accepts(selection.hour.as_ref(), Some(&e.hour))
                && accepts(selection.event_name.as_deref(), e.event_name.as_deref())
        })
        .collect()
}

/// Counts records per exact coordinate pair, sorted by latitude then
/// longitude.
#[must_use]
pub fn density(coordinates: impl IntoIterator<Item = (f64, f64)>) -> Vec<DensityPoint> {
    let mut coordinates: Vec<(f64, f64)> = coordinates.into_iter().collect();
    coordinates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut points: Vec<DensityPoint> = Vec::new();
    for (latitude, longitude) in coordinates {
        match points.last_mut() {
            Some(last)
                if last.latitude.total_cmp(&latitude).is_eq()
                    && last.longitude.total_cmp(&longitude).is_eq() =>
            {
                last.count += 1;
            }
            _ => points.push(DensityPoint {
                latitude,
                longitude,
                count: 1,
            }),
        }
    }
    points
}

/// Mean coordinate of the aggregated points, or `None` for no points.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_center(points: &[DensityPoint]) -> Option<MapCenter> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    Some(MapCenter {
        latitude: points.iter().map(|p| p.latitude).sum::<f64>() / n,
        longitude: points.iter().map(|p| p.longitude).sum::<f64>() / n,
    })
}

/// Zoom for the occurrence map: closer in as the location filter narrows.
#[must_use]
pub const fn occurrence_zoom(selection: &FilterSelection) -> u8 {
    if selection.neighborhood.is_some() {
        12
    } else if selection.region.is_some() {
        10
    } else {
        9
    }
}

/// Builds a zero-filled histogram over `range`. Hours outside the range
/// are ignored.
#[must_use]
pub fn hour_histogram(
    hours: impl IntoIterator<Item = u8>,
    range: RangeInclusive<u8>,
    title: &str,
    y_label: &str,
) -> HourHistogram {
    let mut buckets: Vec<HourCount> = range
        .clone()
        .map(|hour| HourCount { hour, count: 0 })
        .collect();
    let start = *range.start();
    for hour in hours {
        if range.contains(&hour) {
            buckets[usize::from(hour - start)].count += 1;
        }
    }
    HourHistogram {
        title: title.to_string(),
        y_label: y_label.to_string(),
        buckets,
    }
}

/// Hour with the highest count, the earliest one on ties. `None` when
/// every bucket is zero.
#[must_use]
pub fn peak_hour(histogram: &HourHistogram) -> Option<u8> {
    let mut best: Option<HourCount> = None;
    for bucket in &histogram.buckets {
        if bucket.count > best.map_or(0, |b| b.count) {
            best = Some(*bucket);
        }
    }
    best.map(|b| b.hour)
}

/// Most frequent value, the lexicographically smallest one on ties.
#[must_use]
pub fn most_frequent<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// Formats an hour as `HH:00`.
#[must_use]
pub fn format_hour(hour: u8) -> String {
    format!("{hour:02}:00")
}

/// Formats a count with `.` as the thousands separator (`1234567` is
/// `1.234.567`).
#[must_use]
pub fn format_count(count: usize) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

fn peak_hour_card(histogram: &HourHistogram) -> SummaryCard {
    SummaryCard::new(
        "Most Frequent Hour",
        peak_hour(histogram).map_or_else(|| NOT_AVAILABLE.to_string(), format_hour),
    )
}

/// One half of the dashboard: a map, a histogram and three cards.
struct Panel {
    map: MapFigure,
    histogram: HourHistogram,
    total: SummaryCard,
    peak_hour: SummaryCard,
    most_frequent: SummaryCard,
}

fn occurrence_panel(occurrences: &[&OccurrenceRecord], selection: &FilterSelection) -> Panel {
    let points = density(
        occurrences
            .iter()
            .filter_map(|o| Some((o.latitude?, o.longitude?))),
    );
    let map = match mean_center(&points) {
        Some(center) => MapFigure::Density(DensityMap {
            points,
            center,
            zoom: occurrence_zoom(selection),
            radius: OCCURRENCE_RADIUS,
            opacity: OCCURRENCE_OPACITY,
        }),
        None => MapFigure::Placeholder {
            message: NO_OCCURRENCES_MESSAGE.to_string(),
        },
    };

    let histogram = hour_histogram(
        occurrences.iter().map(|o| o.hour),
        OCCURRENCE_HOURS,
        "Occurrences by Hour of Day",
        "Number of Occurrences",
    );
    let total = occurrences.iter().filter(|o| o.hour != 0).count();
    let top_category = most_frequent(occurrences.iter().filter_map(|o| o.category.as_deref()))
        .unwrap_or(NOT_AVAILABLE);

    Panel {
        map,
        total: SummaryCard::new("Total Occurrences", format_count(total)),
        peak_hour: peak_hour_card(&histogram),
        most_frequent: SummaryCard::new("Most Frequent Nature", top_category),
        histogram,
    }
}

fn event_panel(events: &[&EventRecord]) -> Panel {
    let map = if events.is_empty() {
        MapFigure::Placeholder {
            message: NO_EVENTS_MESSAGE.to_string(),
        }
    } else {
        MapFigure::Density(DensityMap {
            points: density(events.iter().map(|e| (e.latitude, e.longitude))),
            center: EVENT_MAP_CENTER,
            zoom: EVENT_ZOOM,
            radius: EVENT_RADIUS,
            opacity: EVENT_OPACITY,
        })
    };

    let histogram = hour_histogram(
        events.iter().map(|e| e.hour),
        EVENT_HOURS,
        "Events by Hour of Day",
        "Number of Events",
    );
    let top_event = most_frequent(events.iter().filter_map(|e| e.event_name.as_deref()))
        .unwrap_or(NOT_AVAILABLE);

    Panel {
        map,
        total: SummaryCard::new("Total Events", format_count(events.len())),
        peak_hour: peak_hour_card(&histogram),
        most_frequent: SummaryCard::new("Most Frequent Event", top_event),
        histogram,
    }
}

/// Filters both datasets by `selection` and builds the full update.
#[must_use]
pub fn build_update(
    occurrences: &[OccurrenceRecord],
    events: &[EventRecord],
    selection: &FilterSelection,
) -> DashboardUpdate {
    let occurrences = filter_occurrences(occurrences, selection);
    let events = filter_events(events, selection);
    log::debug!(
        "Filter {selection:?} matched {} occurrences and {} events",
        occurrences.len(),
        events.len()
    );

    let occurrence = occurrence_panel(&occurrences, selection);
    let event = event_panel(&events);

    DashboardUpdate {
        occurrence_map: occurrence.map,
        occurrence_hours: occurrence.histogram,
        occurrence_total: occurrence.total,
        occurrence_peak_hour: occurrence.peak_hour,
        top_category: occurrence.most_frequent,
        event_map: event.map,
        event_hours: event.histogram,
        top_event: event.most_frequent,
        event_peak_hour: event.peak_hour,
        event_total: event.total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_counts_with_dot_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_234), "1.234");
        assert_eq!(format_count(1_234_567), "1.234.567");
    }

    #[test]
    fn formats_hours() {
        assert_eq!(format_hour(9), "09:00");
        assert_eq!(format_hour(23), "23:00");
    }

    #[test]
    fn histograms_are_zero_filled() {
        let occurrences = hour_histogram([0, 5, 5, 23], OCCURRENCE_HOURS, "", "");
        assert_eq!(occurrences.buckets.len(), 23);
        assert_eq!(occurrences.buckets[0], HourCount { hour: 1, count: 0 });
        assert_eq!(occurrences.buckets[4], HourCount { hour: 5, count: 2 });
        assert_eq!(occurrences.buckets[22], HourCount { hour: 23, count: 1 });
        assert_eq!(occurrences.buckets.iter().map(|b| b.count).sum::<u64>(), 3);

        let events = hour_histogram([0, 0, 12], EVENT_HOURS, "", "");
        assert_eq!(events.buckets.len(), 24);
        assert_eq!(events.buckets[0].count, 2);
    }

    #[test]
    fn peak_hour_prefers_earliest_on_ties() {
        let histogram = hour_histogram([14, 9, 14, 9, 3], EVENT_HOURS, "", "");
        assert_eq!(peak_hour(&histogram), Some(9));

        let empty = hour_histogram([], OCCURRENCE_HOURS, "", "");
        assert_eq!(peak_hour(&empty), None);

        let only_zero = hour_histogram([0, 0], OCCURRENCE_HOURS, "", "");
        assert_eq!(peak_hour(&only_zero), None);
    }

    #[test]
    fn most_frequent_breaks_ties_lexicographically() {
        assert_eq!(most_frequent(["b", "a", "b", "a", "c"]), Some("a"));
        assert_eq!(most_frequent(["x", "y", "y"]), Some("y"));
        assert_eq!(most_frequent(std::iter::empty()), None);
    }

    #[test]
    fn density_groups_exact_coordinates() {
        let points = density([(-23.5, -46.6), (-23.6, -46.7), (-23.5, -46.6)]);
        assert_eq!(
            points,
            vec![
                DensityPoint { latitude: -23.6, longitude: -46.7, count: 1 },
                DensityPoint { latitude: -23.5, longitude: -46.6, count: 2 },
            ]
        );

        let center = mean_center(&points).unwrap();
        assert!((center.latitude - -23.55).abs() < 1e-9);
        assert!((center.longitude - -46.65).abs() < 1e-9);
        assert_eq!(mean_center(&[]), None);
    }

    #[test]
    fn zoom_follows_location_filters() {
        let mut selection = FilterSelection::default();
        assert_eq!(occurrence_zoom(&selection), 9);
        selection.region = Some(crime_dashboard_dataset_models::Region::Center);
        assert_eq!(occurrence_zoom(&selection), 10);
        selection.neighborhood = Some("Sé".to_string());
        assert_eq!(occurrence_zoom(&selection), 12);
    }
}
