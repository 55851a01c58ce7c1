//! Data models for stored data.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use tidecast_types::{CurrentConditions, DailySummary, iso_date};

/// One immutable snapshot of current conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReading {
    /// Database row ID.
    pub id: i64,
    /// `"<place>, <country-code>"`, as reported by the provider.
    pub location: String,
    /// Temperature in Fahrenheit.
    pub temperature: f64,
    /// Relative humidity percentage.
    pub humidity: f64,
    /// Capitalized condition text.
    pub description: String,
    /// Provider icon code.
    pub icon: Option<String>,
    /// When this reading was persisted.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl StoredReading {
    /// Create a StoredReading from provider conditions. The ID is set on insert.
    pub fn from_conditions(conditions: &CurrentConditions, timestamp: OffsetDateTime) -> Self {
        Self {
            id: 0,
            location: conditions.location.clone(),
            temperature: conditions.temperature,
            humidity: conditions.humidity,
            description: conditions.description.clone(),
            icon: conditions.icon.clone(),
            timestamp,
        }
    }
}

/// One summarized forecast for a location and calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredForecast {
    /// Database row ID.
    pub id: i64,
    pub location: String,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
    /// Sorted, deduplicated condition texts joined with `", "`.
    pub description: String,
    /// Empty if no sample carried an icon.
    pub icon: String,
    /// When this record was created or last refreshed.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl StoredForecast {
    /// Create a StoredForecast from a daily summary. The ID is set on insert.
    pub fn from_summary(location: &str, summary: &DailySummary, timestamp: OffsetDateTime) -> Self {
        Self {
            id: 0,
            location: location.to_string(),
            date: summary.date,
            temp_min: summary.temp_min,
            temp_max: summary.temp_max,
            humidity: summary.humidity,
            description: summary.description.clone(),
            icon: summary.icon.clone(),
            timestamp,
        }
    }
}
