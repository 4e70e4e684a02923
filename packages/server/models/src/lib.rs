#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API response types for the dashboard server.
//!
//! Filter options and dashboard updates are served as-is from the
//! analytics models; the types here cover the server's own endpoints.

use crime_dashboard_dataset::criminal::OccurrenceLoadReport;
use crime_dashboard_dataset::events::EventLoadReport;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// What was loaded at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLoadStatus {
    /// Occurrences available to the dashboard.
    pub occurrences: usize,
    /// Events available to the dashboard.
    pub events: usize,
    /// Occurrence loading diagnostics.
    pub occurrence_report: OccurrenceLoadReport,
    /// Event loading diagnostics.
    pub event_report: EventLoadReport,
}

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}
