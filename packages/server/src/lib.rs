#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the occurrences and events dashboard.
//!
//! Both datasets are loaded once before the server binds. The loaded
//! [`Dashboard`] is shared read-only across workers; every filter change
//! in the browser becomes one `GET /dashboard/api/update` request that is
//! answered synchronously from it.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use crime_dashboard_analytics::Dashboard;
use crime_dashboard_dataset::config::DataPaths;
use crime_dashboard_dataset::{DatasetError, Datasets};
use crime_dashboard_server_models::ApiLoadStatus;
use thiserror::Error;

/// Default bind address when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Default port when `PORT` is unset or invalid.
pub const DEFAULT_PORT: u16 = 8080;

/// Errors that can stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A dataset could not be loaded.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// The HTTP server failed to bind or crashed.
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Loaded datasets, filter options and the update pipeline.
    pub dashboard: Arc<Dashboard>,
    /// Counts and diagnostics from startup loading.
    pub load_status: ApiLoadStatus,
}

impl AppState {
    /// Wraps loaded datasets into server state.
    #[must_use]
    pub fn from_datasets(datasets: Datasets) -> Self {
        let load_status = ApiLoadStatus {
            occurrences: datasets.occurrences.len(),
            events: datasets.events.len(),
            occurrence_report: datasets.occurrence_report,
            event_report: datasets.event_report,
        };
        Self {
            dashboard: Arc::new(Dashboard::new(datasets.occurrences, datasets.events)),
            load_status,
        }
    }
}

/// Where to find the data and where to listen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Source file locations.
    pub data: DataPaths,
    /// Address to bind to.
    pub bind_addr: String,
    /// Port to bind to.
    pub port: u16,
}

impl ServerConfig {
    /// Reads the data paths plus `BIND_ADDR` and `PORT` from the
    /// environment.
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            data: DataPaths::from_env(),
            bind_addr,
            port,
        }
    }
}

/// Loads both datasets and builds the server state.
///
/// # Errors
///
/// Returns [`ServerError::Dataset`] if any source file is missing or
/// malformed.
pub fn load_state(paths: &DataPaths) -> Result<AppState, ServerError> {
    let datasets = crime_dashboard_dataset::load_all(paths)?;
    Ok(AppState::from_datasets(datasets))
}

/// Registers every route. Shared by [`run_server`] and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(handlers::query_error))
        .route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health))
        .service(
            web::scope("/dashboard")
                .route("", web::get().to(handlers::dashboard_redirect))
                .route("/", web::get().to(handlers::dashboard_page))
                .route("/api/options", web::get().to(handlers::options))
                .route("/api/update", web::get().to(handlers::update))
                .route("/api/status", web::get().to(handlers::status)),
        );
}

/// Loads the datasets and starts the dashboard server.
///
/// This is a regular async function; the caller provides the runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError::Dataset`] if loading fails, or
/// [`ServerError::Io`] if the HTTP server fails to bind or encounters a
/// runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let state = web::Data::new(load_state(&config.data)?);

    log::info!(
        "Starting server on {}:{} (dashboard at /dashboard/)",
        config.bind_addr,
        config.port
    );

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await?;

    Ok(())
}
