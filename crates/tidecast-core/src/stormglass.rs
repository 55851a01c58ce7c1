//! StormGlass marine client and the combined beach forecast.
//!
//! Tide and sea-state data are not transformed: the provider's JSON is handed
//! back as-is. A missing API key is not a startup error; every call simply
//! fails with [`Error::NotConfigured`] and the combined forecast reports an
//! error sentinel in its place.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, error};

use tidecast_types::{Coordinates, capitalize};

use crate::error::{Error, Result};
use crate::openweather::mask_key;
use crate::traits::MarineProvider;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.stormglass.io/v2";

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sea-state parameters requested for beach conditions.
pub const BEACH_PARAMS: &[&str] = &[
    "waterTemperature",
    "waveHeight",
    "waveDirection",
    "swellHeight",
    "swellPeriod",
    "swellDirection",
    "windWaveHeight",
    "windWavePeriod",
    "windWaveDirection",
];

const PROVIDER: &str = "StormGlass";

/// HTTP client for StormGlass.
#[derive(Clone)]
pub struct StormGlassClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl fmt::Debug for StormGlassClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StormGlassClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_deref().map(mask_key))
            .finish()
    }
}

impl StormGlassClient {
    /// Create a client against the production API.
    pub fn new(api_key: Option<&str>) -> Result<Self> {
        Self::with_options(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client against a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the URL is not http(s) or the
    /// underlying client cannot be built.
    pub fn with_options(api_key: Option<&str>, base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::InvalidConfig(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
        })
    }

    async fn get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<serde_json::Value> {
        let api_key = self.api_key.as_deref().ok_or(Error::NotConfigured(PROVIDER))?;
        let url = format!("{}/{}", self.base_url, endpoint);

        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .header(reqwest::header::AUTHORIZATION, api_key)
            .send()
            .await
            .map_err(|source| Error::Http {
                provider: PROVIDER,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(|source| Error::Http {
            provider: PROVIDER,
            source,
        })
    }
}

fn window_query(
    point: Coordinates,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Vec<(&'static str, String)> {
    vec![
        ("lat", point.latitude.to_string()),
        ("lng", point.longitude.to_string()),
        ("start", start.unix_timestamp().to_string()),
        ("end", end.unix_timestamp().to_string()),
    ]
}

#[async_trait]
impl MarineProvider for StormGlassClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn tide_extremes(
        &self,
        point: Coordinates,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<serde_json::Value> {
        self.get("tide/extremes/point", &window_query(point, start, end))
            .await
    }

    async fn beach_conditions(
        &self,
        point: Coordinates,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<serde_json::Value> {
        let mut query = window_query(point, start, end);
        query.push(("params", BEACH_PARAMS.join(",")));
        self.get("weather/point", &query).await
    }
}

/// Tides and sea state for one point, each half either raw provider JSON or
/// an `{"error": "..."}` sentinel.
#[derive(Debug, Clone, Serialize)]
pub struct BeachForecast {
    pub tides: serde_json::Value,
    pub conditions: serde_json::Value,
    pub location: Coordinates,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Fetch tides for the next 24 hours and sea state for the last 24 hours.
///
/// Never fails: provider errors are logged and replaced by error sentinels.
pub async fn beach_forecast(provider: &dyn MarineProvider, point: Coordinates) -> BeachForecast {
    let now = OffsetDateTime::now_utc();
    let day = time::Duration::days(1);

    let tides = match provider.tide_extremes(point, now, now + day).await {
        Ok(value) => value,
        Err(e) => sentinel("tide data", &e),
    };
    let conditions = match provider.beach_conditions(point, now - day, now).await {
        Ok(value) => value,
        Err(e) => sentinel("beach conditions", &e),
    };

    BeachForecast {
        tides,
        conditions,
        location: point,
        timestamp: now,
    }
}

fn sentinel(what: &str, err: &Error) -> serde_json::Value {
    let message = match err {
        Error::NotConfigured(_) => {
            error!("No StormGlass API key provided");
            format!("{} service not configured", capitalize(what))
        }
        other => {
            error!("Error fetching {}: {}", what, other);
            format!("Failed to fetch {}: {}", what, other)
        }
    };
    serde_json::json!({ "error": message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn point() -> Coordinates {
        Coordinates::new(21.27, -157.82)
    }

    #[tokio::test]
    async fn test_tide_extremes_passes_through() {
        let server = MockServer::start().await;
        let body = serde_json::json!({"data": [{"height": 0.4, "time": "2024-06-01T03:12:00+00:00", "type": "high"}]});

        Mock::given(method("GET"))
            .and(path("/tide/extremes/point"))
            .and(header("Authorization", "sg-key"))
            .and(query_param("lat", "21.27"))
            .and(query_param("lng", "-157.82"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            StormGlassClient::with_options(Some("sg-key"), &server.uri(), DEFAULT_TIMEOUT).unwrap();
        let now = OffsetDateTime::now_utc();
        let value = client
            .tide_extremes(point(), now, now + time::Duration::days(1))
            .await
            .unwrap();

        assert_eq!(value, body);
    }

    #[tokio::test]
    async fn test_beach_conditions_requests_marine_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather/point"))
            .and(query_param("params", BEACH_PARAMS.join(",")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"hours": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            StormGlassClient::with_options(Some("sg-key"), &server.uri(), DEFAULT_TIMEOUT).unwrap();
        let now = OffsetDateTime::now_utc();
        let value = client
            .beach_conditions(point(), now - time::Duration::days(1), now)
            .await
            .unwrap();

        assert_eq!(value["hours"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_unconfigured_client_reports_sentinels() {
        let client = StormGlassClient::new(None).unwrap();
        assert!(!client.is_configured());

        let forecast = beach_forecast(&client, point()).await;
        assert_eq!(forecast.tides["error"], "Tide data service not configured");
        assert_eq!(
            forecast.conditions["error"],
            "Beach conditions service not configured"
        );
        assert_eq!(forecast.location, point());
    }

    #[tokio::test]
    async fn test_provider_failure_reports_sentinel() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(402).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client =
            StormGlassClient::with_options(Some("sg-key"), &server.uri(), DEFAULT_TIMEOUT).unwrap();
        let forecast = beach_forecast(&client, point()).await;

        let message = forecast.tides["error"].as_str().unwrap();
        assert!(message.starts_with("Failed to fetch tide data"));
        assert!(message.contains("402"));
    }

    #[test]
    fn test_blank_key_counts_as_unconfigured() {
        let client = StormGlassClient::new(Some("   ")).unwrap();
        assert!(!client.is_configured());
    }
}
