//! Mock providers for testing.
//!
//! [`MockWeatherProvider`] and [`MockMarineProvider`] implement the provider
//! traits over scripted JSON bodies, so the orchestration and HTTP layers can
//! be tested without network access.
//!
//! # Features
//!
//! - **Scripted responses**: Bodies are plain JSON and go through the same
//!   decoding path as real responses
//! - **Failure injection**: Fail every call, or only the next `n` calls, with a
//!   chosen [`MockFailure`]
//! - **Latency simulation**: Add an artificial delay to every call
//! - **Call counting**: Inspect how many requests each endpoint received

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use tidecast_types::{
    Coordinates, CurrentWeatherResponse, ForecastResponse, ParseError, QueryParams,
};

use crate::error::{Error, Result};
use crate::traits::{MarineProvider, WeatherProvider};

const WEATHER_PROVIDER: &str = "MockWeather";
const MARINE_PROVIDER: &str = "MockMarine";

/// How an injected failure surfaces to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockFailure {
    /// Provider answers 503.
    #[default]
    Unavailable,
    /// Provider answers 404 (unknown location).
    NotFound,
    /// Provider answers 200 with a body that cannot be decoded.
    Malformed,
}

impl MockFailure {
    fn to_error(self, provider: &'static str, forecast: bool) -> Error {
        match self {
            MockFailure::Unavailable => Error::Status {
                provider,
                status: 503,
                body: "Mock failure".to_string(),
            },
            MockFailure::NotFound => Error::Status {
                provider,
                status: 404,
                body: r#"{"cod":"404","message":"city not found"}"#.to_string(),
            },
            MockFailure::Malformed if forecast => Error::Parse(
                ParseError::InvalidForecastPayload("expected value at line 1 column 1".to_string()),
            ),
            MockFailure::Malformed => Error::Parse(ParseError::InvalidProviderResponse(
                "expected value at line 1 column 1".to_string(),
            )),
        }
    }
}

/// Shared failure-injection and latency state.
#[derive(Debug, Default)]
struct FailureScript {
    should_fail: AtomicBool,
    failure: RwLock<MockFailure>,
    remaining_failures: AtomicU32,
    latency_ms: AtomicU64,
}

impl FailureScript {
    async fn check(&self, provider: &'static str, forecast: bool) -> Result<()> {
        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        // Transient failures take precedence.
        if self.remaining_failures.load(Ordering::Relaxed) > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(self.failure.read().await.to_error(provider, forecast));
        }

        if self.should_fail.load(Ordering::Relaxed) {
            Err(self.failure.read().await.to_error(provider, forecast))
        } else {
            Ok(())
        }
    }

    async fn set(&self, failure: Option<MockFailure>) {
        match failure {
            Some(f) => {
                *self.failure.write().await = f;
                self.should_fail.store(true, Ordering::Relaxed);
            }
            None => self.should_fail.store(false, Ordering::Relaxed),
        }
    }

    async fn fail_next(&self, count: u32, failure: MockFailure) {
        *self.failure.write().await = failure;
        self.remaining_failures.store(count, Ordering::Relaxed);
    }
}

/// A scripted weather provider.
///
/// # Example
///
/// ```
/// use tidecast_core::{MockWeatherProvider, WeatherProvider};
/// use tidecast_types::QueryParams;
///
/// #[tokio::main]
/// async fn main() {
///     let provider = MockWeatherProvider::new();
///     let response = provider
///         .current(&QueryParams::City("Springfield,US".into()))
///         .await
///         .unwrap();
///     assert_eq!(response.name.as_deref(), Some("Springfield"));
///     assert_eq!(provider.current_calls(), 1);
/// }
/// ```
#[derive(Debug)]
pub struct MockWeatherProvider {
    current_body: RwLock<serde_json::Value>,
    forecast_body: RwLock<serde_json::Value>,
    last_params: RwLock<Option<QueryParams>>,
    current_calls: AtomicU32,
    forecast_calls: AtomicU32,
    script: FailureScript,
}

impl Default for MockWeatherProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWeatherProvider {
    /// Create a provider answering with a clear day in Springfield.
    pub fn new() -> Self {
        Self {
            current_body: RwLock::new(Self::default_current()),
            forecast_body: RwLock::new(Self::default_forecast()),
            last_params: RwLock::new(None),
            current_calls: AtomicU32::new(0),
            forecast_calls: AtomicU32::new(0),
            script: FailureScript::default(),
        }
    }

    fn default_current() -> serde_json::Value {
        serde_json::json!({
            "coord": {"lon": -89.64, "lat": 39.8},
            "weather": [{"description": "clear sky", "icon": "01d"}],
            "main": {"temp": 72.5, "humidity": 40},
            "name": "Springfield",
            "sys": {"country": "US"}
        })
    }

    fn default_forecast() -> serde_json::Value {
        let start = OffsetDateTime::now_utc().unix_timestamp();
        let list: Vec<_> = (0..8)
            .map(|i| {
                serde_json::json!({
                    "dt": start + i * 3 * 3600,
                    "main": {"temp": 60.0 + i as f64, "humidity": 50},
                    "weather": [{"description": "few clouds", "icon": "02d"}]
                })
            })
            .collect();
        serde_json::json!({
            "list": list,
            "city": {"name": "Springfield", "country": "US"}
        })
    }

    /// Replace the current-conditions body.
    pub async fn set_current(&self, body: serde_json::Value) {
        *self.current_body.write().await = body;
    }

    /// Replace the forecast body.
    pub async fn set_forecast(&self, body: serde_json::Value) {
        *self.forecast_body.write().await = body;
    }

    /// Fail every call with `failure`, or stop failing with `None`.
    pub async fn set_failure(&self, failure: Option<MockFailure>) {
        self.script.set(failure).await;
    }

    /// Fail only the next `count` calls.
    pub async fn fail_next(&self, count: u32, failure: MockFailure) {
        self.script.fail_next(count, failure).await;
    }

    /// Delay every call.
    pub fn set_latency(&self, latency: Duration) {
        self.script
            .latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of current-conditions requests received.
    pub fn current_calls(&self) -> u32 {
        self.current_calls.load(Ordering::Relaxed)
    }

    /// Number of forecast requests received.
    pub fn forecast_calls(&self) -> u32 {
        self.forecast_calls.load(Ordering::Relaxed)
    }

    /// Query parameters of the most recent request.
    pub async fn last_params(&self) -> Option<QueryParams> {
        self.last_params.read().await.clone()
    }
}

fn encode(body: &serde_json::Value, err: fn(String) -> ParseError) -> Result<Vec<u8>> {
    serde_json::to_vec(body).map_err(|e| Error::Parse(err(e.to_string())))
}

#[async_trait]
impl WeatherProvider for MockWeatherProvider {
    fn name(&self) -> &'static str {
        WEATHER_PROVIDER
    }

    async fn current(&self, params: &QueryParams) -> Result<CurrentWeatherResponse> {
        self.current_calls.fetch_add(1, Ordering::Relaxed);
        *self.last_params.write().await = Some(params.clone());
        self.script.check(WEATHER_PROVIDER, false).await?;

        let body = encode(
            &*self.current_body.read().await,
            ParseError::InvalidProviderResponse,
        )?;
        Ok(CurrentWeatherResponse::from_slice(&body)?)
    }

    async fn forecast(&self, params: &QueryParams) -> Result<ForecastResponse> {
        self.forecast_calls.fetch_add(1, Ordering::Relaxed);
        *self.last_params.write().await = Some(params.clone());
        self.script.check(WEATHER_PROVIDER, true).await?;

        let body = encode(
            &*self.forecast_body.read().await,
            ParseError::InvalidForecastPayload,
        )?;
        Ok(ForecastResponse::from_slice(&body)?)
    }
}

/// A scripted marine provider.
#[derive(Debug)]
pub struct MockMarineProvider {
    configured: AtomicBool,
    tides: RwLock<serde_json::Value>,
    conditions: RwLock<serde_json::Value>,
    tide_calls: AtomicU32,
    condition_calls: AtomicU32,
    script: FailureScript,
}

impl Default for MockMarineProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMarineProvider {
    /// Create a configured provider with one high tide and an empty hour list.
    pub fn new() -> Self {
        Self {
            configured: AtomicBool::new(true),
            tides: RwLock::new(serde_json::json!({
                "data": [{"height": 0.52, "time": "2024-06-01T04:10:00+00:00", "type": "high"}],
                "meta": {"station": {"name": "mock"}}
            })),
            conditions: RwLock::new(serde_json::json!({"hours": [], "meta": {}})),
            tide_calls: AtomicU32::new(0),
            condition_calls: AtomicU32::new(0),
            script: FailureScript::default(),
        }
    }

    /// Create a provider without credentials.
    pub fn unconfigured() -> Self {
        let provider = Self::new();
        provider.configured.store(false, Ordering::Relaxed);
        provider
    }

    /// Replace the tide body.
    pub async fn set_tides(&self, body: serde_json::Value) {
        *self.tides.write().await = body;
    }

    /// Replace the sea-state body.
    pub async fn set_conditions(&self, body: serde_json::Value) {
        *self.conditions.write().await = body;
    }

    /// Fail every call with `failure`, or stop failing with `None`.
    pub async fn set_failure(&self, failure: Option<MockFailure>) {
        self.script.set(failure).await;
    }

    /// Number of tide requests received.
    pub fn tide_calls(&self) -> u32 {
        self.tide_calls.load(Ordering::Relaxed)
    }

    /// Number of sea-state requests received.
    pub fn condition_calls(&self) -> u32 {
        self.condition_calls.load(Ordering::Relaxed)
    }

    async fn answer(&self, body: &RwLock<serde_json::Value>) -> Result<serde_json::Value> {
        if !self.is_configured() {
            return Err(Error::NotConfigured(MARINE_PROVIDER));
        }
        self.script.check(MARINE_PROVIDER, false).await?;
        Ok(body.read().await.clone())
    }
}

#[async_trait]
impl MarineProvider for MockMarineProvider {
    fn name(&self) -> &'static str {
        MARINE_PROVIDER
    }

    fn is_configured(&self) -> bool {
        self.configured.load(Ordering::Relaxed)
    }

    async fn tide_extremes(
        &self,
        _point: Coordinates,
        _start: OffsetDateTime,
        _end: OffsetDateTime,
    ) -> Result<serde_json::Value> {
        self.tide_calls.fetch_add(1, Ordering::Relaxed);
        self.answer(&self.tides).await
    }

    async fn beach_conditions(
        &self,
        _point: Coordinates,
        _start: OffsetDateTime,
        _end: OffsetDateTime,
    ) -> Result<serde_json::Value> {
        self.condition_calls.fetch_add(1, Ordering::Relaxed);
        self.answer(&self.conditions).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stormglass::beach_forecast;

    fn city() -> QueryParams {
        QueryParams::City("Springfield,US".to_string())
    }

    #[tokio::test]
    async fn test_default_forecast_decodes() {
        let provider = MockWeatherProvider::new();
        let response = provider.forecast(&city()).await.unwrap();
        assert_eq!(response.list.len(), 8);
        assert_eq!(provider.forecast_calls(), 1);
        assert_eq!(provider.current_calls(), 0);
    }

    #[tokio::test]
    async fn test_set_current_overrides_body() {
        let provider = MockWeatherProvider::new();
        provider
            .set_current(serde_json::json!({
                "weather": [{"description": "snow", "icon": "13d"}],
                "main": {"temp": 20.0, "humidity": 90},
                "name": "Oslo",
                "sys": {"country": "NO"}
            }))
            .await;

        let response = provider.current(&city()).await.unwrap();
        assert_eq!(response.name.as_deref(), Some("Oslo"));
        assert_eq!(provider.last_params().await, Some(city()));
    }

    #[tokio::test]
    async fn test_persistent_failure() {
        let provider = MockWeatherProvider::new();
        provider.set_failure(Some(MockFailure::NotFound)).await;

        let err = provider.current(&city()).await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 404, .. }));

        provider.set_failure(None).await;
        assert!(provider.current(&city()).await.is_ok());
    }

    #[tokio::test]
    async fn test_transient_failures() {
        let provider = MockWeatherProvider::new();
        provider.fail_next(2, MockFailure::Unavailable).await;

        assert!(provider.forecast(&city()).await.is_err());
        assert!(provider.forecast(&city()).await.is_err());
        assert!(provider.forecast(&city()).await.is_ok());
        assert_eq!(provider.forecast_calls(), 3);
    }

    #[tokio::test]
    async fn test_malformed_forecast_is_payload_error() {
        let provider = MockWeatherProvider::new();
        provider.set_failure(Some(MockFailure::Malformed)).await;

        let err = provider.forecast(&city()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ParseError::InvalidForecastPayload(_))
        ));
        assert!(!err.is_provider_unavailable());
    }

    #[tokio::test]
    async fn test_marine_mock_feeds_beach_forecast() {
        let provider = MockMarineProvider::new();
        let forecast = beach_forecast(&provider, Coordinates::new(21.27, -157.82)).await;

        assert_eq!(forecast.tides["data"][0]["type"], "high");
        assert_eq!(forecast.conditions["hours"], serde_json::json!([]));
        assert_eq!(provider.tide_calls(), 1);
        assert_eq!(provider.condition_calls(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_marine_mock() {
        let provider = MockMarineProvider::unconfigured();
        let forecast = beach_forecast(&provider, Coordinates::new(0.0, 0.0)).await;
        assert_eq!(forecast.tides["error"], "Tide data service not configured");
    }
}
