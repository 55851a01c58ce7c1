//! Fetch, aggregate and persist weather data.
//!
//! Both operations call the upstream provider on every request. The store is
//! a write-through cache: current conditions are always appended, forecasts
//! are reconciled day by day against what is already stored.
//!
//! Transport and response-shape failures are logged and reported as "no
//! data" (`Ok(None)`). Only storage failures and unusable forecast payloads
//! are surfaced as [`WeatherError`].

use serde::Serialize;
use time::{Date, OffsetDateTime};
use tracing::{debug, error, info, warn};

use tidecast_core::aggregate::{aggregate, daily_summaries};
use tidecast_core::{Coordinates, CurrentConditions, NormalizedLocation, ParseError};
use tidecast_store::{StoredForecast, StoredReading};

use crate::state::AppState;

/// Errors surfaced to the HTTP layer.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WeatherError {
    /// The forecast response could not be turned into daily summaries.
    #[error("Invalid forecast payload: {0}")]
    InvalidForecastPayload(String),

    /// The store rejected a write.
    #[error("Storage failure: {0}")]
    Storage(#[from] tidecast_store::Error),
}

/// A persisted current-conditions snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentWeather {
    #[serde(flatten)]
    pub reading: StoredReading,
    /// Provider coordinates of the resolved place, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// Reconciled daily forecasts for one location.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastBatch {
    /// Location key the forecasts are stored under.
    pub location: String,
    /// One record per day, ascending by date.
    pub forecasts: Vec<StoredForecast>,
    pub created: usize,
    pub refreshed: usize,
    pub reused: usize,
}

/// Fetch current conditions and append them to the reading log.
///
/// Returns `Ok(None)` when the provider is unreachable, answers with an error
/// status, or answers with a body missing the conditions or location.
///
/// # Errors
///
/// Returns [`WeatherError::Storage`] if the reading cannot be persisted.
pub async fn fetch_current(
    state: &AppState,
    location: &NormalizedLocation,
) -> Result<Option<CurrentWeather>, WeatherError> {
    info!("Fetching weather data for {}", location.label);

    let response = match state.weather.current(&location.params).await {
        Ok(response) => response,
        Err(e) if e.is_provider_unavailable() => {
            warn!(
                "Error fetching weather data for {} from {}: {}",
                location.label,
                state.weather.name(),
                e
            );
            return Ok(None);
        }
        Err(e) => {
            error!(
                "Unusable weather response for {} from {}: {}",
                location.label,
                state.weather.name(),
                e
            );
            return Ok(None);
        }
    };

    let conditions = match CurrentConditions::try_from(response) {
        Ok(conditions) => conditions,
        Err(e) => {
            warn!("Unusable weather response for {}: {}", location.label, e);
            return Ok(None);
        }
    };

    let reading = state.store.lock().await.insert_reading(&conditions)?;
    info!(
        "Successfully retrieved weather data for {} ({})",
        location.label, reading.location
    );

    Ok(Some(CurrentWeather {
        reading,
        coordinates: conditions.coordinates,
    }))
}

/// Fetch the multi-day forecast, reduce it to daily summaries starting today,
/// and reconcile them with the store.
///
/// Returns `Ok(None)` when the provider is unreachable or answers with an
/// error status.
///
/// # Errors
///
/// - [`WeatherError::InvalidForecastPayload`] if the response cannot be
///   decoded, has no samples, or has a sample without described conditions
/// - [`WeatherError::Storage`] if a day cannot be persisted; days reconciled
///   before the failure stay stored
pub async fn fetch_and_reconcile_forecast(
    state: &AppState,
    location: &NormalizedLocation,
) -> Result<Option<ForecastBatch>, WeatherError> {
    forecast_from(state, location, OffsetDateTime::now_utc().date()).await
}

/// Forecast window starting at `today`.
async fn forecast_from(
    state: &AppState,
    location: &NormalizedLocation,
    today: Date,
) -> Result<Option<ForecastBatch>, WeatherError> {
    info!("Fetching forecast for {}", location.label);

    let response = match state.weather.forecast(&location.params).await {
        Ok(response) => response,
        Err(e) if e.is_provider_unavailable() => {
            warn!(
                "Error fetching forecast for {} from {}: {}",
                location.label,
                state.weather.name(),
                e
            );
            return Ok(None);
        }
        Err(tidecast_core::Error::Parse(e)) => {
            warn!("Invalid forecast payload for {}: {}", location.label, e);
            return Err(invalid_payload(e));
        }
        Err(e) => {
            error!("Forecast provider {} unusable: {}", state.weather.name(), e);
            return Ok(None);
        }
    };

    let key = response
        .location()
        .unwrap_or_else(|| location.label.clone());

    let samples = response.into_samples().map_err(invalid_payload)?;
    let days = aggregate(&samples).map_err(invalid_payload)?;

    let summaries = daily_summaries(&days, today, state.config.forecast.days);
    debug!(
        "Aggregated {} samples into {} days, keeping {} from {}",
        samples.len(),
        days.len(),
        summaries.len(),
        today
    );

    let outcome = state.store.lock().await.reconcile_forecasts(
        &key,
        &summaries,
        state.config.forecast.refresh_policy(),
    )?;

    Ok(Some(ForecastBatch {
        location: key,
        forecasts: outcome.forecasts,
        created: outcome.created,
        refreshed: outcome.refreshed,
        reused: outcome.reused,
    }))
}

fn invalid_payload(e: ParseError) -> WeatherError {
    match e {
        ParseError::InvalidForecastPayload(msg) => WeatherError::InvalidForecastPayload(msg),
        other => WeatherError::InvalidForecastPayload(other.to_string()),
    }
}
