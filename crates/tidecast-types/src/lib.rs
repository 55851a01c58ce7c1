//! Platform-agnostic types for the tidecast weather backend.
//!
//! This crate holds everything that does not need a network or a database:
//!
//! - Location query normalization ([`normalize`])
//! - Strongly-typed provider response schemas ([`payload`])
//! - Domain types shared by aggregation and storage
//! - Error types for input and payload validation
//!
//! # Example
//!
//! ```
//! use tidecast_types::{CurrentConditions, CurrentWeatherResponse};
//!
//! let body = br#"{
//!     "weather": [{"description": "light rain", "icon": "10d"}],
//!     "main": {"temp": 61.2, "humidity": 88},
//!     "name": "Seattle",
//!     "sys": {"country": "US"}
//! }"#;
//!
//! let response = CurrentWeatherResponse::from_slice(body)?;
//! let conditions = CurrentConditions::try_from(response)?;
//! assert_eq!(conditions.location, "Seattle, US");
//! assert_eq!(conditions.description, "Light rain");
//! # Ok::<(), tidecast_types::ParseError>(())
//! ```

pub mod error;
pub mod location;
pub mod payload;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use location::{DEFAULT_COUNTRY, LocationQuery, NormalizedLocation, QueryParams, normalize};
pub use payload::{CurrentWeatherResponse, ForecastResponse};
pub use types::{
    Coordinates, CurrentConditions, DailySummary, ForecastSample, WeatherCondition, capitalize,
    iso_date,
};
