//! Core domain types shared by the provider, aggregation and storage layers.

use serde::{Deserialize, Serialize};
use time::Date;

time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, -90..=90.
    #[serde(alias = "lat")]
    pub latitude: f64,
    /// Longitude in degrees, -180..=180.
    #[serde(alias = "lon", alias = "lng")]
    pub longitude: f64,
}

impl Coordinates {
    /// Create a coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and within range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// One weather-condition entry (e.g. "light rain" / "10d").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherCondition {
    /// Condition text as sent by the provider.
    pub description: String,
    /// Provider icon code.
    pub icon: Option<String>,
}

/// Validated current conditions for a location, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// `"<place>, <country-code>"` as reported by the provider.
    pub location: String,
    /// Temperature in provider units (Fahrenheit).
    pub temperature: f64,
    /// Relative humidity percentage.
    pub humidity: f64,
    /// Capitalized condition text.
    pub description: String,
    /// Provider icon code.
    pub icon: Option<String>,
    /// Where the provider resolved the query to. Not persisted.
    pub coordinates: Option<Coordinates>,
}

/// A single raw forecast sample before day-level aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Unix timestamp of the sample.
    pub timestamp: i64,
    /// Temperature in provider units.
    pub temperature: f64,
    /// Relative humidity percentage.
    pub humidity: f64,
    /// Condition entries; the first one is the primary condition.
    pub conditions: Vec<WeatherCondition>,
}

/// One calendar day's forecast, reduced from its samples.
///
/// This is what the aggregator hands to the store for reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Calendar date, the natural key together with the location.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// Lowest sample temperature.
    pub temp_min: f64,
    /// Highest sample temperature.
    pub temp_max: f64,
    /// Humidity of the last sample seen for the day.
    pub humidity: f64,
    /// Sorted, deduplicated condition texts joined with `", "`.
    pub description: String,
    /// Icon of the first sample seen for the day, or empty.
    pub icon: String,
}

/// Capitalize the way the dashboard expects: first character upper case,
/// the remainder lower case.
///
/// ```
/// use tidecast_types::capitalize;
///
/// assert_eq!(capitalize("light RAIN"), "Light rain");
/// assert_eq!(capitalize(""), "");
/// ```
#[must_use]
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
