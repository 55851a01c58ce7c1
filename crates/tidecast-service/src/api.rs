//! REST API endpoints for the tidecast service.
//!
//! Every response body is JSON with a `status` of `"success"` or `"error"`.
//! Successful responses carry their payload under `data`; errors carry a
//! human-readable `message`.
//!
//! # Endpoints
//!
//! - `GET /api/health` - Database connectivity check
//! - `GET /api/weather?city=|zip=&country=` - Fetch and log current conditions
//! - `GET /api/weather/history?limit=&offset=&location=&since=&until=&order=` - Logged conditions
//! - `GET /api/forecast?city=|zip=&country=` - Fetch and reconcile daily forecasts
//! - `GET /api/forecast/history?limit=&offset=&location=&from=&to=&order=` - Stored daily forecasts
//! - `GET /api/beach?lat=&lng=` - Tides and sea state, passed through
//!
//! ## Error Handling
//!
//! Handlers return [`AppError`], which renders the JSON error body and status
//! code. Store errors map to HTTP 500.
//!
//! # Example
//!
//! ```ignore
//! use tidecast_service::api;
//!
//! let app = api::router().with_state(state);
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use tracing::{debug, error, info, warn};

use tidecast_core::{Coordinates, LocationQuery, NormalizedLocation, beach_forecast, normalize};
use tidecast_store::{ForecastQuery, ReadingQuery, StoredForecast, StoredReading};
use tidecast_types::{DEFAULT_COUNTRY, iso_date};

use crate::state::AppState;
use crate::weather::{self, WeatherError};

/// Default number of history entries returned.
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;
/// Upper bound on history entries per request.
pub const MAX_HISTORY_LIMIT: u32 = 100;

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/weather", get(get_weather))
        .route("/api/weather/history", get(get_weather_history))
        .route("/api/forecast", get(get_forecast))
        .route("/api/forecast/history", get(get_forecast_history))
        .route("/api/beach", get(get_beach))
}

/// Successful response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Json<Self> {
        Json(Self {
            status: "success",
            data,
            location: None,
        })
    }

    fn located(data: T, location: String) -> Json<Self> {
        Json(Self {
            status: "success",
            data,
            location: Some(location),
        })
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: String,
    pub database: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Health check endpoint. Returns 500 when the database does not answer.
async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let result = state.store.lock().await.ping();

    let (code, status, message, database) = match result {
        Ok(()) => (
            StatusCode::OK,
            "healthy",
            "Service is running".to_string(),
            "connected",
        ),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "unhealthy",
                e.to_string(),
                "connection failed",
            )
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            message,
            database,
            version: env!("CARGO_PKG_VERSION"),
            timestamp: OffsetDateTime::now_utc(),
        }),
    )
}

/// Location parameters shared by the weather and forecast endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LocationParams {
    pub city: Option<String>,
    pub zip: Option<String>,
    /// Two-letter country code, defaults to `US`.
    pub country: Option<String>,
}

impl LocationParams {
    /// Resolve to a normalized location. A ZIP code wins over a city.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] if neither parameter is present or the
    /// value cannot be normalized.
    pub fn resolve(&self) -> Result<NormalizedLocation, AppError> {
        let country = Some(
            self.country
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(DEFAULT_COUNTRY),
        );

        let present = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

        let query = match (present(&self.zip), present(&self.city)) {
            (Some(zip), _) => LocationQuery::postal_code(zip, country),
            (None, Some(city)) => LocationQuery::city(city, country),
            (None, None) => {
                return Err(AppError::BadRequest(
                    "Either 'city' or 'zip' parameter is required".to_string(),
                ));
            }
        };

        normalize(&query).map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(params)| params)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// Fetch current conditions and log them.
async fn get_weather(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LocationParams>, QueryRejection>,
) -> Result<Json<ApiResponse<weather::CurrentWeather>>, AppError> {
    let params = query_params(query)?;
    debug!("Weather request: {:?}", params);

    let location = params.resolve().inspect_err(|e| warn!("{}", e))?;
    info!("Processing weather request for {}", location.label);

    match weather::fetch_current(&state, &location).await? {
        Some(current) => Ok(ApiResponse::located(current, location.label)),
        None => Err(AppError::no_data(location.label)),
    }
}

/// Sort direction for history endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

fn history_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_HISTORY_LIMIT).min(MAX_HISTORY_LIMIT)
}

fn location_filter(location: Option<&str>) -> Option<&str> {
    location.map(str::trim).filter(|l| !l.is_empty())
}

/// Query parameters for `/api/weather/history`.
#[derive(Debug, Default, Deserialize)]
pub struct ReadingHistoryParams {
    /// Maximum entries to return (default 10, capped at 100).
    pub limit: Option<u32>,
    /// Entries to skip, for paging.
    pub offset: Option<u32>,
    /// Restrict to one stored location key.
    pub location: Option<String>,
    /// RFC 3339 lower bound on the reading timestamp.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub since: Option<OffsetDateTime>,
    /// RFC 3339 upper bound on the reading timestamp.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub until: Option<OffsetDateTime>,
    #[serde(default)]
    pub order: SortOrder,
}

impl ReadingHistoryParams {
    fn to_query(&self) -> ReadingQuery {
        let mut query = ReadingQuery::new().limit(history_limit(self.limit));
        if let Some(offset) = self.offset {
            query = query.offset(offset);
        }
        if let Some(location) = location_filter(self.location.as_deref()) {
            query = query.location(location);
        }
        if let Some(since) = self.since {
            query = query.since(since);
        }
        if let Some(until) = self.until {
            query = query.until(until);
        }
        if self.order == SortOrder::Asc {
            query = query.oldest_first();
        }
        query
    }
}

/// Logged current-conditions snapshots, newest first by default.
async fn get_weather_history(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ReadingHistoryParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<StoredReading>>>, AppError> {
    let params = query_params(query)?;
    debug!("Weather history request: {:?}", params);

    let readings = state.store.lock().await.query_readings(&params.to_query())?;
    Ok(ApiResponse::success(readings))
}

/// Fetch the forecast and reconcile it with stored days.
async fn get_forecast(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LocationParams>, QueryRejection>,
) -> Result<Json<ApiResponse<weather::ForecastBatch>>, AppError> {
    let params = query_params(query)?;
    let location = params.resolve().inspect_err(|e| warn!("{}", e))?;
    info!("Processing forecast request for {}", location.label);

    match weather::fetch_and_reconcile_forecast(&state, &location).await? {
        Some(batch) => Ok(ApiResponse::located(batch, location.label)),
        None => Err(AppError::no_data(location.label)),
    }
}

/// Query parameters for `/api/forecast/history`.
#[derive(Debug, Default, Deserialize)]
pub struct ForecastHistoryParams {
    /// Maximum entries to return (default 10, capped at 100).
    pub limit: Option<u32>,
    /// Entries to skip, for paging.
    pub offset: Option<u32>,
    /// Restrict to one stored location key.
    pub location: Option<String>,
    /// First date to include, `YYYY-MM-DD`.
    #[serde(default, with = "iso_date::option")]
    pub from: Option<Date>,
    /// Last date to include, `YYYY-MM-DD`.
    #[serde(default, with = "iso_date::option")]
    pub to: Option<Date>,
    #[serde(default)]
    pub order: SortOrder,
}

impl ForecastHistoryParams {
    fn to_query(&self) -> ForecastQuery {
        let mut query = ForecastQuery::new().limit(history_limit(self.limit));
        if let Some(offset) = self.offset {
            query = query.offset(offset);
        }
        if let Some(location) = location_filter(self.location.as_deref()) {
            query = query.location(location);
        }
        if let Some(from) = self.from {
            query = query.from_date(from);
        }
        if let Some(to) = self.to {
            query = query.to_date(to);
        }
        if self.order == SortOrder::Asc {
            query = query.oldest_first();
        }
        query
    }
}

/// Stored daily forecasts, latest date first by default.
async fn get_forecast_history(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ForecastHistoryParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<StoredForecast>>>, AppError> {
    let params = query_params(query)?;
    debug!("Forecast history request: {:?}", params);

    let forecasts = state.store.lock().await.query_forecasts(&params.to_query())?;
    Ok(ApiResponse::success(forecasts))
}

/// Beach endpoint parameters.
#[derive(Debug, Deserialize)]
pub struct BeachParams {
    pub lat: f64,
    pub lng: f64,
}

/// Tides for the next 24 hours and sea state for the last 24 hours.
///
/// Provider failures do not fail the request; each half reports an
/// `{"error": ...}` object instead.
async fn get_beach(
    State(state): State<Arc<AppState>>,
    query: Result<Query<BeachParams>, QueryRejection>,
) -> Result<Json<ApiResponse<tidecast_core::BeachForecast>>, AppError> {
    let params = query_params(query)?;
    let point = Coordinates::new(params.lat, params.lng);
    if !point.is_valid() {
        return Err(AppError::BadRequest(format!(
            "Coordinates out of range: lat={}, lng={}",
            params.lat, params.lng
        )));
    }

    info!("Fetching beach data for {}, {}", point.latitude, point.longitude);
    let forecast = beach_forecast(state.marine.as_ref(), point).await;
    Ok(ApiResponse::success(forecast))
}

/// API error type.
#[derive(Debug)]
pub enum AppError {
    /// The provider had nothing for this location.
    NoData { location: String },
    BadRequest(String),
    /// The provider answered with an unusable forecast.
    UnprocessableEntity(String),
    Store(tidecast_store::Error),
}

impl AppError {
    fn no_data(location: String) -> Self {
        AppError::NoData { location }
    }
}

impl From<tidecast_store::Error> for AppError {
    fn from(e: tidecast_store::Error) -> Self {
        AppError::Store(e)
    }
}

impl From<WeatherError> for AppError {
    fn from(e: WeatherError) -> Self {
        match e {
            WeatherError::InvalidForecastPayload(msg) => AppError::UnprocessableEntity(msg),
            WeatherError::Storage(e) => AppError::Store(e),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NoData { location } => write!(f, "No weather data found for {}", location),
            AppError::BadRequest(msg) => write!(f, "{}", msg),
            AppError::UnprocessableEntity(msg) => write!(f, "Invalid forecast payload: {}", msg),
            AppError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match self {
            AppError::NoData { location } => {
                error!("{}", message);
                (
                    StatusCode::NOT_FOUND,
                    serde_json::json!({
                        "status": "error",
                        "message": message,
                        "requested_location": location,
                        "suggestion": "Please check the location and try again.",
                    }),
                )
            }
            AppError::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "status": "error", "message": message }),
            ),
            AppError::UnprocessableEntity(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({ "status": "error", "message": message }),
            ),
            AppError::Store(_) => {
                error!("Storage failure: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "status": "error", "message": message }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use tidecast_core::{MockFailure, MockMarineProvider, MockWeatherProvider};
    use tidecast_store::Store;

    use crate::config::Config;

    struct TestApp {
        state: Arc<AppState>,
        weather: Arc<MockWeatherProvider>,
        marine: Arc<MockMarineProvider>,
    }

    fn create_test_app() -> TestApp {
        let weather = Arc::new(MockWeatherProvider::new());
        let marine = Arc::new(MockMarineProvider::new());
        let state = AppState::new(
            Store::open_in_memory().unwrap(),
            Config::default(),
            weather.clone(),
            marine.clone(),
        );
        TestApp {
            state,
            weather,
            marine,
        }
    }

    async fn get_json(state: &Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router()
            .with_state(Arc::clone(state))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();
        let (status, json) = get_json(&app.state, "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["database"], "connected");
        assert!(json["version"].is_string());
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_weather_requires_city_or_zip() {
        let app = create_test_app();
        let (status, json) = get_json(&app.state, "/api/weather?country=GB").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Either 'city' or 'zip' parameter is required");
        assert_eq!(app.weather.current_calls(), 0);
    }

    #[tokio::test]
    async fn test_weather_invalid_zip() {
        let app = create_test_app();
        let (status, json) = get_json(&app.state, "/api/weather?zip=abc").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["message"].as_str().unwrap().starts_with("Invalid location"));
    }

    #[tokio::test]
    async fn test_weather_by_zip_defaults_country() {
        let app = create_test_app();
        let (status, json) = get_json(&app.state, "/api/weather?zip=9-0-2-1-0").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["location"], "ZIP: 90210, Country: US");
        assert_eq!(json["data"]["location"], "Springfield, US");
        assert_eq!(json["data"]["description"], "Clear sky");
        assert_eq!(json["data"]["icon"], "01d");
        assert!(json["data"]["id"].is_i64());
        assert_eq!(
            app.weather.last_params().await,
            Some(tidecast_core::QueryParams::PostalCode("90210,US".to_string()))
        );
    }

    #[tokio::test]
    async fn test_weather_zip_wins_over_city() {
        let app = create_test_app();
        let (status, json) =
            get_json(&app.state, "/api/weather?city=Paris&zip=10001&country=US").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["location"], "ZIP: 10001, Country: US");
    }

    #[tokio::test]
    async fn test_weather_not_found() {
        let app = create_test_app();
        app.weather.set_failure(Some(MockFailure::NotFound)).await;

        let (status, json) = get_json(&app.state, "/api/weather?city=Atlantis").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            json["message"],
            "No weather data found for City: Atlantis, Country: US"
        );
        assert_eq!(json["requested_location"], "City: Atlantis, Country: US");
        assert_eq!(json["suggestion"], "Please check the location and try again.");
    }

    #[tokio::test]
    async fn test_weather_history_newest_first() {
        let app = create_test_app();
        for _ in 0..12 {
            let (status, _) = get_json(&app.state, "/api/weather?city=Springfield").await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, json) = get_json(&app.state, "/api/weather/history").await;
        assert_eq!(status, StatusCode::OK);

        let data = json["data"].as_array().unwrap();
        assert_eq!(data.len(), 10);
        let ids: Vec<i64> = data.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] > w[1]));

        let (_, json) = get_json(&app.state, "/api/weather/history?limit=3").await;
        assert_eq!(json["data"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_history_rejects_bad_limit() {
        let app = create_test_app();
        let (status, json) = get_json(&app.state, "/api/weather/history?limit=lots").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], "error");
    }

    fn ids(json: &serde_json::Value) -> Vec<i64> {
        json["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_weather_history_paging_and_order() {
        let app = create_test_app();
        for _ in 0..5 {
            get_json(&app.state, "/api/weather?city=Springfield").await;
        }

        let (_, newest) = get_json(&app.state, "/api/weather/history?limit=2").await;
        let (_, next) = get_json(&app.state, "/api/weather/history?limit=2&offset=2").await;
        let (_, oldest) = get_json(&app.state, "/api/weather/history?limit=2&order=asc").await;

        let all = {
            let (_, json) = get_json(&app.state, "/api/weather/history?order=asc").await;
            ids(&json)
        };
        assert_eq!(all.len(), 5);
        assert_eq!(ids(&newest), vec![all[4], all[3]]);
        assert_eq!(ids(&next), vec![all[2], all[1]]);
        assert_eq!(ids(&oldest), vec![all[0], all[1]]);
    }

    #[tokio::test]
    async fn test_weather_history_filters() {
        let app = create_test_app();
        for _ in 0..3 {
            get_json(&app.state, "/api/weather?zip=62701").await;
        }

        let (_, json) = get_json(&app.state, "/api/weather/history?since=2000-01-01T00:00:00Z").await;
        assert_eq!(ids(&json).len(), 3);

        let (_, json) = get_json(&app.state, "/api/weather/history?until=2000-01-01T00:00:00Z").await;
        assert!(ids(&json).is_empty());

        let (_, json) = get_json(&app.state, "/api/weather/history?location=Springfield,%20US").await;
        assert_eq!(ids(&json).len(), 3);

        let (_, json) = get_json(&app.state, "/api/weather/history?location=Elsewhere,%20FR").await;
        assert!(ids(&json).is_empty());

        let (status, json) = get_json(&app.state, "/api/weather/history?since=yesterday").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], "error");
    }

    #[tokio::test]
    async fn test_forecast_history_window_and_paging() {
        use tidecast_core::DailySummary;
        use tidecast_store::RefreshPolicy;
        use time::macros::date;

        let app = create_test_app();
        let day = |date| DailySummary {
            date,
            temp_min: 60.0,
            temp_max: 70.0,
            humidity: 50.0,
            description: "Rain".to_string(),
            icon: "10d".to_string(),
        };
        {
            let store = app.state.store.lock().await;
            let week: Vec<_> = [
                date!(2024 - 06 - 01),
                date!(2024 - 06 - 02),
                date!(2024 - 06 - 03),
                date!(2024 - 06 - 04),
                date!(2024 - 06 - 05),
            ]
            .into_iter()
            .map(day)
            .collect();
            store
                .reconcile_forecasts("Springfield, US", &week, RefreshPolicy::Never)
                .unwrap();
            store
                .reconcile_forecasts("Lisbon, PT", &[day(date!(2024 - 06 - 03))], RefreshPolicy::Never)
                .unwrap();
        }

        let dates = |json: &serde_json::Value| -> Vec<String> {
            json["data"]
                .as_array()
                .unwrap()
                .iter()
                .map(|f| f["date"].as_str().unwrap().to_string())
                .collect()
        };

        let (status, json) = get_json(
            &app.state,
            "/api/forecast/history?location=Springfield,%20US&from=2024-06-02&to=2024-06-04&order=asc",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(dates(&json), vec!["2024-06-02", "2024-06-03", "2024-06-04"]);

        let (_, json) = get_json(
            &app.state,
            "/api/forecast/history?location=Springfield,%20US&limit=2&offset=1",
        )
        .await;
        assert_eq!(dates(&json), vec!["2024-06-04", "2024-06-03"]);

        let (_, json) = get_json(&app.state, "/api/forecast/history?from=2024-06-03&to=2024-06-03").await;
        assert_eq!(json["data"].as_array().unwrap().len(), 2);

        let (status, _) = get_json(&app.state, "/api/forecast/history?from=June").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_forecast_endpoint_is_idempotent() {
        let app = create_test_app();

        let (status, first) = get_json(&app.state, "/api/forecast?city=Springfield").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["status"], "success");
        assert_eq!(first["data"]["location"], "Springfield, US");
        let created = first["data"]["created"].as_u64().unwrap();
        assert!(created >= 1);

        let (status, second) = get_json(&app.state, "/api/forecast?city=Springfield").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["data"]["created"], 0);
        assert_eq!(second["data"]["reused"].as_u64().unwrap(), created);
        assert_eq!(second["data"]["forecasts"], first["data"]["forecasts"]);
        assert_eq!(app.weather.forecast_calls(), 2);

        let (_, history) = get_json(
            &app.state,
            "/api/forecast/history?location=Springfield,%20US",
        )
        .await;
        assert_eq!(
            history["data"].as_array().unwrap().len() as u64,
            created
        );
    }

    #[tokio::test]
    async fn test_forecast_invalid_payload() {
        let app = create_test_app();
        app.weather
            .set_forecast(serde_json::json!({"list": [], "city": {"name": "Springfield"}}))
            .await;

        let (status, json) = get_json(&app.state, "/api/forecast?zip=62701").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid forecast payload"));
    }

    #[tokio::test]
    async fn test_forecast_provider_down() {
        let app = create_test_app();
        app.weather.set_failure(Some(MockFailure::Unavailable)).await;

        let (status, json) = get_json(&app.state, "/api/forecast?city=Springfield").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["status"], "error");
    }

    #[tokio::test]
    async fn test_beach_passes_provider_data_through() {
        let app = create_test_app();
        let (status, json) = get_json(&app.state, "/api/beach?lat=21.27&lng=-157.82").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["tides"]["data"][0]["type"], "high");
        assert_eq!(json["data"]["location"]["latitude"], 21.27);
        assert_eq!(app.marine.tide_calls(), 1);
        assert_eq!(app.marine.condition_calls(), 1);
    }

    #[tokio::test]
    async fn test_beach_provider_failure_reports_sentinels() {
        let app = create_test_app();
        app.marine.set_failure(Some(MockFailure::Unavailable)).await;

        let (status, json) = get_json(&app.state, "/api/beach?lat=21.27&lng=-157.82").await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["data"]["tides"]["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to fetch tide data"));
        assert!(json["data"]["conditions"]["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to fetch beach conditions"));
    }

    #[tokio::test]
    async fn test_beach_validates_coordinates() {
        let app = create_test_app();

        let (status, _) = get_json(&app.state, "/api/beach?lat=95&lng=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = get_json(&app.state, "/api/beach?lat=21.27").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], "error");
        assert_eq!(app.marine.tide_calls(), 0);
    }

    #[test]
    fn test_location_params_resolve() {
        let params = LocationParams {
            city: Some("Lisbon".to_string()),
            zip: Some(String::new()),
            country: Some("PT".to_string()),
        };
        let location = params.resolve().unwrap();
        assert_eq!(location.label, "City: Lisbon, Country: PT");

        assert!(matches!(
            LocationParams::default().resolve(),
            Err(AppError::BadRequest(_))
        ));
    }
}
