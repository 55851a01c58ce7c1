//! Trait abstractions for upstream providers.
//!
//! [`WeatherProvider`] and [`MarineProvider`] abstract over the real HTTP
//! clients and the mocks in [`crate::mock`], so the orchestration layer can be
//! tested without network access.

use async_trait::async_trait;
use time::OffsetDateTime;

use tidecast_types::{Coordinates, CurrentWeatherResponse, ForecastResponse, QueryParams};

use crate::error::Result;

/// Source of current conditions and multi-day forecasts.
///
/// # Example
///
/// ```ignore
/// use tidecast_core::{WeatherProvider, Result};
/// use tidecast_types::QueryParams;
///
/// async fn print_temp<P: WeatherProvider + ?Sized>(provider: &P) -> Result<()> {
///     let response = provider.current(&QueryParams::City("Oslo,NO".into())).await?;
///     println!("{:?}", response.main);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Human-readable provider name for logs.
    fn name(&self) -> &'static str;

    /// Fetch current conditions.
    async fn current(&self, params: &QueryParams) -> Result<CurrentWeatherResponse>;

    /// Fetch the raw multi-day forecast (3-hourly samples).
    async fn forecast(&self, params: &QueryParams) -> Result<ForecastResponse>;
}

/// Source of tide and sea-state data. Responses are passed through untouched.
#[async_trait]
pub trait MarineProvider: Send + Sync {
    /// Human-readable provider name for logs.
    fn name(&self) -> &'static str;

    /// Whether credentials are available. Unconfigured providers fail every
    /// call with [`crate::Error::NotConfigured`].
    fn is_configured(&self) -> bool;

    /// Tide extremes (highs and lows) at a point within a time window.
    async fn tide_extremes(
        &self,
        point: Coordinates,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<serde_json::Value>;

    /// Water temperature, wave and swell conditions at a point within a time window.
    async fn beach_conditions(
        &self,
        point: Coordinates,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<serde_json::Value>;
}
