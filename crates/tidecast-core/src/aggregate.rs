//! Forecast aggregation.
//!
//! The forecast endpoint returns 3-hourly samples. This module groups them by
//! calendar date and reduces each group to a [`DailySummary`]:
//!
//! - `temp_min` / `temp_max`: minimum and maximum sample temperature
//! - `description`: every condition text seen that day, capitalized,
//!   deduplicated and sorted, joined with `", "`
//! - `icon`: the primary icon of the first sample of the day
//! - `humidity`: the humidity of the last sample of the day
//!
//! Humidity is intentionally last-sample-wins rather than an average; samples
//! are expected in chronological order.
//!
//! Dates are the UTC calendar date of the sample timestamp. No provider
//! timezone offset is applied.
//!
//! # Example
//!
//! ```
//! use tidecast_core::aggregate::{aggregate, daily_summaries, FORECAST_DAYS};
//! use tidecast_types::{ForecastSample, WeatherCondition};
//! use time::macros::date;
//!
//! let samples = vec![ForecastSample {
//!     timestamp: 1_717_243_200, // 2024-06-01 12:00 UTC
//!     temperature: 71.26,
//!     humidity: 40.0,
//!     conditions: vec![WeatherCondition {
//!         description: "clear sky".into(),
//!         icon: Some("01d".into()),
//!     }],
//! }];
//!
//! let days = aggregate(&samples)?;
//! let summaries = daily_summaries(&days, date!(2024 - 06 - 01), FORECAST_DAYS);
//! assert_eq!(summaries[0].temp_max, 71.3);
//! assert_eq!(summaries[0].description, "Clear sky");
//! # Ok::<(), tidecast_types::ParseError>(())
//! ```

use std::collections::{BTreeMap, BTreeSet};

use time::{Date, OffsetDateTime};

use tidecast_types::{DailySummary, ForecastSample, ParseError, ParseResult, capitalize};

/// Maximum number of days kept from one forecast response.
pub const FORECAST_DAYS: usize = 5;

/// Running reduction of one calendar day's samples.
#[derive(Debug, Clone, PartialEq)]
pub struct DayAccumulator {
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
    pub descriptions: BTreeSet<String>,
    pub icon: Option<String>,
    pub samples: usize,
}

impl Default for DayAccumulator {
    fn default() -> Self {
        Self {
            temp_min: f64::INFINITY,
            temp_max: f64::NEG_INFINITY,
            humidity: 0.0,
            descriptions: BTreeSet::new(),
            icon: None,
            samples: 0,
        }
    }
}

impl DayAccumulator {
    /// Fold one sample into the day.
    pub fn push(&mut self, sample: &ForecastSample) {
        self.temp_min = self.temp_min.min(sample.temperature);
        self.temp_max = self.temp_max.max(sample.temperature);
        self.humidity = sample.humidity;

        for condition in &sample.conditions {
            let description = condition.description.trim();
            if !description.is_empty() {
                self.descriptions.insert(capitalize(description));
            }
        }

        if self.icon.is_none() {
            self.icon = sample
                .conditions
                .first()
                .and_then(|c| c.icon.clone())
                .filter(|i| !i.is_empty());
        }

        self.samples += 1;
    }

    /// Produce the rounded summary for `date`.
    pub fn summarize(&self, date: Date) -> DailySummary {
        DailySummary {
            date,
            temp_min: round1(self.temp_min),
            temp_max: round1(self.temp_max),
            humidity: round1(self.humidity),
            description: self
                .descriptions
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            icon: self.icon.clone().unwrap_or_default(),
        }
    }
}

/// Calendar date (UTC) of a unix timestamp.
///
/// # Errors
///
/// Returns [`ParseError::InvalidForecastPayload`] if the timestamp is out of
/// the representable range.
pub fn sample_date(timestamp: i64) -> ParseResult<Date> {
    OffsetDateTime::from_unix_timestamp(timestamp)
        .map(|dt| dt.date())
        .map_err(|e| {
            ParseError::InvalidForecastPayload(format!("invalid timestamp {}: {}", timestamp, e))
        })
}

/// Group samples by calendar date.
///
/// # Errors
///
/// Returns [`ParseError::InvalidForecastPayload`] if `samples` is empty or a
/// timestamp cannot be converted to a date.
pub fn aggregate(samples: &[ForecastSample]) -> ParseResult<BTreeMap<Date, DayAccumulator>> {
    if samples.is_empty() {
        return Err(ParseError::InvalidForecastPayload(
            "no forecast samples".to_string(),
        ));
    }

    let mut days: BTreeMap<Date, DayAccumulator> = BTreeMap::new();
    for sample in samples {
        let date = sample_date(sample.timestamp)?;
        days.entry(date).or_default().push(sample);
    }

    Ok(days)
}

/// Keep dates on or after `today`, at most `limit` of them, in ascending order.
///
/// Dates outside the window are dropped silently.
pub fn daily_summaries(
    days: &BTreeMap<Date, DayAccumulator>,
    today: Date,
    limit: usize,
) -> Vec<DailySummary> {
    days.range(today..)
        .take(limit)
        .map(|(date, acc)| acc.summarize(*date))
        .collect()
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
