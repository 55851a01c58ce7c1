//! Weather provider response schemas.
//!
//! These mirror the subset of the OpenWeatherMap `weather` and `forecast`
//! responses we rely on. Fields that the provider may omit are `Option` or
//! `#[serde(default)]`; fields we cannot work without are required, so a
//! missing one fails deserialization and surfaces as a [`ParseError`].

use serde::Deserialize;

use crate::error::{ParseError, ParseResult};
use crate::types::{Coordinates, CurrentConditions, ForecastSample, WeatherCondition, capitalize};

/// A `weather[]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConditionEntry {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
}

impl From<ConditionEntry> for WeatherCondition {
    fn from(entry: ConditionEntry) -> Self {
        WeatherCondition {
            description: entry.description,
            icon: entry.icon.filter(|i| !i.is_empty()),
        }
    }
}

/// The `main` block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MainBlock {
    pub temp: f64,
    pub humidity: f64,
}

/// The `sys` block of a current-conditions response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SysBlock {
    #[serde(default)]
    pub country: Option<String>,
}

/// Response of the current-conditions endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentWeatherResponse {
    #[serde(default)]
    pub weather: Vec<ConditionEntry>,
    #[serde(default)]
    pub main: Option<MainBlock>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sys: Option<SysBlock>,
    #[serde(default)]
    pub coord: Option<Coordinates>,
}

impl CurrentWeatherResponse {
    /// Decode a response body.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidProviderResponse`] if the body is not JSON
    /// or does not match the expected shape.
    pub fn from_slice(body: &[u8]) -> ParseResult<Self> {
        serde_json::from_slice(body).map_err(|e| ParseError::InvalidProviderResponse(e.to_string()))
    }
}

impl TryFrom<CurrentWeatherResponse> for CurrentConditions {
    type Error = ParseError;

    fn try_from(response: CurrentWeatherResponse) -> ParseResult<Self> {
        let main = response.main.ok_or_else(|| {
            ParseError::InvalidProviderResponse("missing 'main' block".to_string())
        })?;
        let condition = response.weather.into_iter().next().ok_or_else(|| {
            ParseError::InvalidProviderResponse("missing 'weather' entries".to_string())
        })?;

        let name = response.name.unwrap_or_default();
        let country = response.sys.and_then(|s| s.country).unwrap_or_default();
        if name.trim().is_empty() && country.trim().is_empty() {
            return Err(ParseError::InvalidProviderResponse(
                "could not determine location".to_string(),
            ));
        }

        Ok(CurrentConditions {
            location: format!("{}, {}", name, country),
            temperature: main.temp,
            humidity: main.humidity,
            description: capitalize(&condition.description),
            icon: condition.icon.filter(|i| !i.is_empty()),
            coordinates: response.coord,
        })
    }
}

/// A `list[]` entry of the forecast response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastEntry {
    pub dt: i64,
    pub main: MainBlock,
    #[serde(default)]
    pub weather: Vec<ConditionEntry>,
}

/// The `city` block of the forecast response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CityBlock {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub coord: Option<Coordinates>,
    /// Offset from UTC in seconds.
    #[serde(default)]
    pub timezone: Option<i32>,
}

/// Response of the forecast endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
    #[serde(default)]
    pub city: Option<CityBlock>,
}

impl ForecastResponse {
    /// Decode a response body.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidForecastPayload`] if the body is not JSON
    /// or does not match the expected shape.
    pub fn from_slice(body: &[u8]) -> ParseResult<Self> {
        serde_json::from_slice(body).map_err(|e| ParseError::InvalidForecastPayload(e.to_string()))
    }

    /// `"<name>, <country>"` from the `city` block, if it names a place.
    pub fn location(&self) -> Option<String> {
        let city = self.city.as_ref()?;
        let name = city.name.as_deref().unwrap_or_default();
        let country = city.country.as_deref().unwrap_or_default();
        if name.trim().is_empty() && country.trim().is_empty() {
            None
        } else {
            Some(format!("{}, {}", name, country))
        }
    }

    /// Convert the `list[]` entries into samples, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidForecastPayload`] if the list is empty, or
    /// if any entry has no `weather[]` conditions or a condition without a
    /// description.
    pub fn into_samples(self) -> ParseResult<Vec<ForecastSample>> {
        if self.list.is_empty() {
            return Err(ParseError::InvalidForecastPayload(
                "forecast list is empty".to_string(),
            ));
        }

        self.list.into_iter().map(ForecastEntry::into_sample).collect()
    }
}

impl ForecastEntry {
    fn into_sample(self) -> ParseResult<ForecastSample> {
        if self.weather.is_empty() {
            return Err(ParseError::InvalidForecastPayload(format!(
                "sample at {} has no weather conditions",
                self.dt
            )));
        }
        if self.weather.iter().any(|c| c.description.trim().is_empty()) {
            return Err(ParseError::InvalidForecastPayload(format!(
                "sample at {} has a condition without a description",
                self.dt
            )));
        }

        Ok(ForecastSample {
            timestamp: self.dt,
            temperature: self.main.temp,
            humidity: self.main.humidity,
            conditions: self.weather.into_iter().map(Into::into).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRENT_BODY: &str = r#"{
        "coord": {"lon": -118.4, "lat": 34.09},
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
        "main": {"temp": 72.3, "feels_like": 71.0, "humidity": 40},
        "name": "Beverly Hills",
        "sys": {"country": "US"}
    }"#;

    #[test]
    fn test_current_conditions_from_response() {
        let response = CurrentWeatherResponse::from_slice(CURRENT_BODY.as_bytes()).unwrap();
        let conditions = CurrentConditions::try_from(response).unwrap();

        assert_eq!(conditions.location, "Beverly Hills, US");
        assert_eq!(conditions.temperature, 72.3);
        assert_eq!(conditions.humidity, 40.0);
        assert_eq!(conditions.description, "Clear sky");
        assert_eq!(conditions.icon.as_deref(), Some("01d"));
        assert_eq!(conditions.coordinates, Some(Coordinates::new(34.09, -118.4)));
    }

    #[test]
    fn test_current_missing_weather_entries() {
        let body = r#"{"weather": [], "main": {"temp": 1.0, "humidity": 2}, "name": "X", "sys": {"country": "Y"}}"#;
        let response = CurrentWeatherResponse::from_slice(body.as_bytes()).unwrap();
        let err = CurrentConditions::try_from(response).unwrap_err();
        assert!(matches!(err, ParseError::InvalidProviderResponse(_)));
    }

    #[test]
    fn test_current_missing_main_block() {
        let body = r#"{"weather": [{"description": "rain"}], "name": "X"}"#;
        let response = CurrentWeatherResponse::from_slice(body.as_bytes()).unwrap();
        let err = CurrentConditions::try_from(response).unwrap_err();
        assert!(err.to_string().contains("main"));
    }

    #[test]
    fn test_current_missing_location() {
        let body = r#"{"weather": [{"description": "rain"}], "main": {"temp": 1.0, "humidity": 2}}"#;
        let response = CurrentWeatherResponse::from_slice(body.as_bytes()).unwrap();
        let err = CurrentConditions::try_from(response).unwrap_err();
        assert!(err.to_string().contains("location"));
    }

    #[test]
    fn test_current_partial_location_is_kept() {
        let body = r#"{"weather": [{"description": "mist", "icon": ""}], "main": {"temp": 1.0, "humidity": 2}, "name": "Somewhere"}"#;
        let response = CurrentWeatherResponse::from_slice(body.as_bytes()).unwrap();
        let conditions = CurrentConditions::try_from(response).unwrap();
        assert_eq!(conditions.location, "Somewhere, ");
        assert_eq!(conditions.icon, None);
    }

    #[test]
    fn test_current_wrong_shape() {
        let err = CurrentWeatherResponse::from_slice(br#"{"main": "hot"}"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidProviderResponse(_)));

        let err = CurrentWeatherResponse::from_slice(b"not json").unwrap_err();
        assert!(matches!(err, ParseError::InvalidProviderResponse(_)));
    }

    #[test]
    fn test_forecast_into_samples() {
        let body = r#"{
            "cod": "200",
            "list": [
                {"dt": 1717200000, "main": {"temp": 70.0, "humidity": 60}, "weather": [{"description": "clear sky", "icon": "01d"}]},
                {"dt": 1717210800, "main": {"temp": 75.0, "humidity": 55}, "weather": [{"description": "clear sky", "icon": "01d"}]}
            ],
            "city": {"name": "Beverly Hills", "country": "US", "timezone": -25200}
        }"#;
        let response = ForecastResponse::from_slice(body.as_bytes()).unwrap();
        assert_eq!(response.city.as_ref().and_then(|c| c.timezone), Some(-25200));
        assert_eq!(response.location().as_deref(), Some("Beverly Hills, US"));

        let samples = response.into_samples().unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].timestamp, 1717200000);
        assert_eq!(samples[1].humidity, 55.0);
        assert_eq!(samples[1].conditions[0].icon.as_deref(), Some("01d"));
    }

    #[test]
    fn test_forecast_empty_list() {
        let response = ForecastResponse::from_slice(br#"{"list": []}"#).unwrap();
        let err = response.into_samples().unwrap_err();
        assert!(matches!(err, ParseError::InvalidForecastPayload(_)));

        let response = ForecastResponse::from_slice(br#"{"cod": "404"}"#).unwrap();
        assert_eq!(response.location(), None);
        assert!(response.into_samples().is_err());
    }

    #[test]
    fn test_forecast_entry_without_conditions_is_rejected() {
        let body = br#"{"list": [
            {"dt": 1717200000, "main": {"temp": 70.0, "humidity": 60}, "weather": [{"description": "rain", "icon": "10d"}]},
            {"dt": 1717210800, "main": {"temp": 71.0, "humidity": 61}, "weather": []}
        ]}"#;
        let err = ForecastResponse::from_slice(body).unwrap().into_samples().unwrap_err();
        assert!(matches!(err, ParseError::InvalidForecastPayload(_)));
        assert!(err.to_string().contains("1717210800"));

        let body = br#"{"list": [{"dt": 1717200000, "main": {"temp": 70.0, "humidity": 60}}]}"#;
        let err = ForecastResponse::from_slice(body).unwrap().into_samples().unwrap_err();
        assert!(matches!(err, ParseError::InvalidForecastPayload(_)));
    }

    #[test]
    fn test_forecast_condition_without_description_is_rejected() {
        let body = br#"{"list": [
            {"dt": 1717200000, "main": {"temp": 70.0, "humidity": 60}, "weather": [{"icon": "01d"}]}
        ]}"#;
        let err = ForecastResponse::from_slice(body).unwrap().into_samples().unwrap_err();
        assert!(matches!(err, ParseError::InvalidForecastPayload(_)));

        let body = br#"{"list": [
            {"dt": 1717200000, "main": {"temp": 70.0, "humidity": 60}, "weather": [{"description": "  ", "icon": "01d"}]}
        ]}"#;
        let err = ForecastResponse::from_slice(body).unwrap().into_samples().unwrap_err();
        assert!(err.to_string().contains("description"));
    }

    #[test]
    fn test_forecast_entry_without_main_is_rejected() {
        let body = br#"{"list": [{"dt": 1, "weather": []}]}"#;
        let err = ForecastResponse::from_slice(body).unwrap_err();
        assert!(matches!(err, ParseError::InvalidForecastPayload(_)));
    }
}
