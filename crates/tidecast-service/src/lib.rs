//! HTTP REST API for current weather, daily forecasts and beach conditions.
//!
//! This crate provides a service that:
//! - Resolves city or ZIP lookups against OpenWeatherMap
//! - Logs every current-conditions fetch to the local database
//! - Aggregates 3-hour forecast samples into daily summaries and stores
//!   one record per location and day
//! - Passes StormGlass tide and sea-state data through to clients
//!
//! # REST API Endpoints
//!
//! - `GET /api/health` - Service and database health check
//! - `GET /api/weather` - Current conditions for `city` or `zip`
//! - `GET /api/weather/history` - Recently logged conditions
//! - `GET /api/forecast` - Daily forecasts for `city` or `zip`
//! - `GET /api/forecast/history` - Stored daily forecasts
//! - `GET /api/beach` - Tides and sea state for `lat`/`lng`
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/tidecast/server.toml`:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:5000"
//!
//! [storage]
//! path = "~/.local/share/tidecast/weather.db"
//!
//! [weather]
//! api_key = "your-openweathermap-key"
//! timeout_secs = 10
//!
//! [marine]
//! api_key = "your-stormglass-key"
//!
//! [forecast]
//! days = 5
//! # Re-fetched days replace stored ones older than this
//! refresh_after_hours = 6
//! ```
//!
//! `OPENWEATHER_API_KEY`, `STORMGLASS_API_KEY`, `TIDECAST_DATABASE` and
//! `PORT` override the file.

pub mod api;
pub mod config;
pub mod state;
pub mod weather;

pub use config::{
    Config, ConfigError, ForecastConfig, MarineConfig, ServerConfig, StorageConfig,
    ValidationError, WeatherConfig,
};
pub use state::AppState;
pub use weather::{CurrentWeather, ForecastBatch, WeatherError};
