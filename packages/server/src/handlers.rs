//! HTTP handler functions for the dashboard.

use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::http::header::{self, ContentType};
use actix_web::{HttpRequest, HttpResponse, web};
use crime_dashboard_analytics_models::FilterSelection;
use crime_dashboard_server_models::{ApiError, ApiHealth};

use crate::AppState;

const INDEX_HTML: &str = include_str!("../static/index.html");
const DASHBOARD_HTML: &str = include_str!("../static/dashboard.html");

/// `GET /`
///
/// Static landing page pointing at the dashboard.
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(INDEX_HTML)
}

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /dashboard`
pub async fn dashboard_redirect() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/dashboard/"))
        .finish()
}

/// `GET /dashboard/`
///
/// The interactive page. It fetches its filter options and updates from
/// the JSON endpoints below.
pub async fn dashboard_page() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(DASHBOARD_HTML)
}

/// `GET /dashboard/api/options`
///
/// Selectable values for every filter control.
pub async fn options(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.dashboard.options())
}

/// `GET /dashboard/api/update`
///
/// Filters both datasets by the query string and returns the maps,
/// histograms and summary cards.
pub async fn update(
    state: web::Data<AppState>,
    selection: web::Query<FilterSelection>,
) -> HttpResponse {
    HttpResponse::Ok().json(state.dashboard.update(&selection))
}

/// `GET /dashboard/api/status`
///
/// Row counts and diagnostics from startup loading.
pub async fn status(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.load_status)
}

/// Turns an unparseable filter query into a JSON 400.
pub fn query_error(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    let message = err.to_string();
    log::debug!("Rejected query '{}': {message}", req.query_string());
    InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ApiError { error: message }),
    )
    .into()
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use crime_dashboard_analytics_models::{DashboardUpdate, FilterOptions, MapFigure};
    use crime_dashboard_dataset::criminal::normalize_occurrences;
    use crime_dashboard_dataset::events::normalize_events;
    use crime_dashboard_dataset::zones::ZoneTable;
    use crime_dashboard_dataset::Datasets;
    use serde_json::json;

    use crate::{AppState, configure};

    const OCCURRENCES: &str = "\
Data Ocorrencia BO,Hora Ocorrencia BO,Bairro,Natureza Apurada,Latitude,Longitude
2024-01-10,09:00,Moema,Theft,-23.601,-46.665
2024-01-11,0930,Moema,Theft,-23.601,-46.665
2024-02-12,9,Moema,Theft,-23.602,-46.666
2024-02-13,18:45,Santana,Robbery,-23.502,-46.625
2024-02-14,,Santana,Robbery,-23.503,-46.626
";

    fn state() -> AppState {
        let zones = ZoneTable::embedded().unwrap();
        let (occurrences, occurrence_report) =
            normalize_occurrences(OCCURRENCES.as_bytes(), &zones).unwrap();
        let venues = vec![json!({"id": 1, "nome": "Arena", "latitude": -23.55, "longitude": -46.63})];
        let events = vec![
            json!({"local_id": 1, "bairro": "moema", "evento_nome": "show", "data_evento": "2024-01-20T21:00:00"}),
            json!({"local_id": 1, "bairro": "", "evento_nome": "feira", "data_evento": "2024-02-03T10:00:00"}),
        ];
        let (events, event_report) = normalize_events(&events, &venues);
        AppState::from_datasets(Datasets {
            occurrences,
            events,
            occurrence_report,
            event_report,
        })
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(actix_web::web::Data::new(state()))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn serves_pages() {
        let app = app!();

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert!(std::str::from_utf8(&body).unwrap().contains("/dashboard/"));

        let resp = test::call_service(&app, test::TestRequest::get().uri("/dashboard/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let page = std::str::from_utf8(&body).unwrap();
        assert!(page.contains("api/update"));
        // Chart styling is set explicitly; Plotly.js has no named templates.
        assert!(page.contains("plot_bgcolor"));
        assert!(!page.contains("template:"));
    }

    #[actix_web::test]
    async fn bare_dashboard_path_redirects() {
        let app = app!();
        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/dashboard").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get("location").unwrap(), "/dashboard/");
    }

    #[actix_web::test]
    async fn lists_filter_options() {
        let app = app!();
        let options: FilterOptions = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/dashboard/api/options").to_request(),
        )
        .await;

        let neighborhoods: Vec<_> = options.neighborhoods.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(neighborhoods, vec!["Moema", "Santana"]);
        assert_eq!(options.hours.len(), 24);
        assert_eq!(options.months.len(), 2);
        assert_eq!(options.event_names.len(), 2);
    }

    #[actix_web::test]
    async fn update_applies_filters() {
        let app = app!();
        let update: DashboardUpdate = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/dashboard/api/update?neighborhood=Moema")
                .to_request(),
        )
        .await;

        assert_eq!(update.occurrence_total.value, "3");
        assert_eq!(update.occurrence_peak_hour.value, "09:00");
        assert_eq!(update.top_category.value, "Theft");
        assert_eq!(update.event_total.value, "1");
        assert_eq!(update.top_event.value, "Show");
        assert!(!update.occurrence_map.is_placeholder());
    }

    #[actix_web::test]
    async fn update_without_matches_returns_placeholders() {
        let app = app!();
        let update: DashboardUpdate = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/dashboard/api/update?region=zone_east&month=2")
                .to_request(),
        )
        .await;

        assert!(matches!(update.occurrence_map, MapFigure::Placeholder { .. }));
        assert_eq!(update.occurrence_total.value, "0");
        assert_eq!(update.top_category.value, "N/A");
        // Region does not constrain events.
        assert_eq!(update.event_total.value, "1");
    }

    #[actix_web::test]
    async fn malformed_query_is_a_bad_request() {
        let app = app!();
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/dashboard/api/update?hour=noon")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn reports_health_and_load_status() {
        let app = app!();
        let health: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/health").to_request(),
        )
        .await;
        assert_eq!(health["healthy"], true);

        let status: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/dashboard/api/status").to_request(),
        )
        .await;
        assert_eq!(status["occurrences"], 5);
        assert_eq!(status["events"], 2);
        assert_eq!(status["occurrenceReport"]["defaultedHour"], 1);
    }
}
