//! Provider clients and forecast aggregation for the tidecast weather backend.
//!
//! This crate talks to the upstream HTTP providers and turns their raw
//! responses into domain values.
//!
//! # Features
//!
//! - **Current conditions and forecasts**: [`OpenWeatherClient`] (imperial units)
//! - **Tides and sea state**: [`StormGlassClient`], passed through untouched
//! - **Daily summaries**: [`aggregate`] reduces 3-hourly samples to one
//!   summary per calendar day
//! - **Testing**: [`MockWeatherProvider`] and [`MockMarineProvider`] implement
//!   the same traits as the real clients
//!
//! # Quick Start
//!
//! ```no_run
//! use tidecast_core::{OpenWeatherClient, WeatherProvider, aggregate};
//! use tidecast_types::{LocationQuery, normalize};
//! use time::OffsetDateTime;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenWeatherClient::new("your-api-key")?;
//!     let location = normalize(&LocationQuery::postal_code("90210", None))?;
//!
//!     let samples = client.forecast(&location.params).await?.into_samples()?;
//!     let days = aggregate::aggregate(&samples)?;
//!     let today = OffsetDateTime::now_utc().date();
//!
//!     for day in aggregate::daily_summaries(&days, today, aggregate::FORECAST_DAYS) {
//!         println!("{}: {} to {} ({})", day.date, day.temp_min, day.temp_max, day.description);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod error;
pub mod mock;
pub mod openweather;
pub mod stormglass;
pub mod traits;

pub use aggregate::{DayAccumulator, FORECAST_DAYS, daily_summaries};
pub use error::{Error, Result};
pub use mock::{MockFailure, MockMarineProvider, MockWeatherProvider};
pub use openweather::OpenWeatherClient;
pub use stormglass::{BeachForecast, StormGlassClient, beach_forecast};
pub use traits::{MarineProvider, WeatherProvider};

// Re-export from tidecast-types
pub use tidecast_types::{
    Coordinates, CurrentConditions, DailySummary, ForecastSample, LocationQuery,
    NormalizedLocation, ParseError, QueryParams, normalize,
};
