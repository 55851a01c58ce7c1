//! OpenWeatherMap client.
//!
//! Talks to the `weather` (current conditions) and `forecast` (5 day / 3 hour)
//! endpoints of the OpenWeatherMap 2.5 API, always in imperial units.
//!
//! # Example
//!
//! ```no_run
//! use tidecast_core::{OpenWeatherClient, WeatherProvider};
//! use tidecast_types::{LocationQuery, normalize};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenWeatherClient::new("your-api-key")?;
//! let location = normalize(&LocationQuery::city("Lisbon", Some("PT")))?;
//!
//! let response = client.current(&location.params).await?;
//! println!("{:?}", response.main);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use tidecast_types::{CurrentWeatherResponse, ForecastResponse, QueryParams};

use crate::error::{Error, Result};
use crate::traits::WeatherProvider;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Per-request timeout for every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Number of 3-hourly samples requested from the forecast endpoint (5 days x 8).
pub const FORECAST_SAMPLE_COUNT: u32 = 40;

/// Unit system requested from the provider (temperatures in Fahrenheit).
pub const UNITS: &str = "imperial";

const PROVIDER: &str = "OpenWeatherMap";

/// HTTP client for OpenWeatherMap.
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url)
            .field("api_key", &mask_key(&self.api_key))
            .finish()
    }
}

impl OpenWeatherClient {
    /// Create a client against the production API with the default timeout.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_options(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client against a custom base URL (e.g. a test server).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the key is empty, the URL is not
    /// http(s), or the underlying client cannot be built.
    pub fn with_options(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(Error::InvalidConfig(
                "OpenWeatherMap API key is required".to_string(),
            ));
        }

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

        debug!(
            "Initialized OpenWeatherMap client at {} with API key {}",
            base_url,
            mask_key(api_key)
        );

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    async fn get(
        &self,
        endpoint: &str,
        params: &QueryParams,
        extra: &[(&str, String)],
    ) -> Result<Vec<u8>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let (name, value) = params.as_pair();

        debug!("GET {} {} {:?}", url, params, extra);

        let response = self
            .client
            .get(&url)
            .query(&[(name, value), ("appid", self.api_key.as_str()), ("units", UNITS)])
            .query(extra)
            .send()
            .await
            .map_err(|source| Error::Http {
                provider: PROVIDER,
                source,
            })?;

        let status = response.status();
        debug!("{} responded with {}", url, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        let body = response.bytes().await.map_err(|source| Error::Http {
            provider: PROVIDER,
            source,
        })?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn current(&self, params: &QueryParams) -> Result<CurrentWeatherResponse> {
        let body = self.get("weather", params, &[]).await?;
        Ok(CurrentWeatherResponse::from_slice(&body)?)
    }

    async fn forecast(&self, params: &QueryParams) -> Result<ForecastResponse> {
        let body = self
            .get(
                "forecast",
                params,
                &[("cnt", FORECAST_SAMPLE_COUNT.to_string())],
            )
            .await?;
        Ok(ForecastResponse::from_slice(&body)?)
    }
}

/// Render a secret as `********` plus its last four characters.
pub fn mask_key(key: &str) -> String {
    let tail: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("********{}", tail)
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
