//! Location query normalization.
//!
//! Turns a city or postal-code lookup into the query parameter the weather
//! provider expects plus a human-readable label used in logs and responses.
//!
//! # Example
//!
//! ```
//! use tidecast_types::{LocationQuery, QueryParams, normalize};
//!
//! let query = LocationQuery::postal_code("9-0-2-1-0", None);
//! let normalized = normalize(&query)?;
//!
//! assert_eq!(normalized.params, QueryParams::PostalCode("90210,US".to_string()));
//! assert_eq!(normalized.label, "ZIP: 90210, Country: US");
//! # Ok::<(), tidecast_types::ParseError>(())
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// Country used for postal-code lookups when the caller does not supply one.
pub const DEFAULT_COUNTRY: &str = "US";

/// A location lookup as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocationQuery {
    /// Lookup by city name with an optional ISO country code.
    City {
        name: String,
        country: Option<String>,
    },
    /// Lookup by postal code. The country defaults to [`DEFAULT_COUNTRY`].
    PostalCode {
        code: String,
        country: Option<String>,
    },
}

impl LocationQuery {
    /// Build a city lookup.
    pub fn city(name: impl Into<String>, country: Option<&str>) -> Self {
        Self::City {
            name: name.into(),
            country: country.map(str::to_string),
        }
    }

    /// Build a postal-code lookup.
    pub fn postal_code(code: impl Into<String>, country: Option<&str>) -> Self {
        Self::PostalCode {
            code: code.into(),
            country: country.map(str::to_string),
        }
    }
}

/// Upstream query parameter for the weather provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryParams {
    /// Sent as `q=<city>[,<country>]`.
    City(String),
    /// Sent as `zip=<digits>,<country>`.
    PostalCode(String),
}

impl QueryParams {
    /// The `(name, value)` pair to append to the upstream query string.
    #[must_use]
    pub fn as_pair(&self) -> (&'static str, &str) {
        match self {
            QueryParams::City(q) => ("q", q.as_str()),
            QueryParams::PostalCode(zip) => ("zip", zip.as_str()),
        }
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, value) = self.as_pair();
        write!(f, "{}={}", name, value)
    }
}

/// Result of [`normalize`]: what to send upstream and how to describe it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedLocation {
    /// Upstream query parameter.
    pub params: QueryParams,
    /// Display label, e.g. `"City: London, Country: GB"`.
    pub label: String,
}

/// Normalize a location lookup.
///
/// Postal codes are reduced to their ASCII digits; a code with no digits is
/// rejected. City names are trimmed, and a blank name is rejected.
///
/// # Errors
///
/// Returns [`ParseError::InvalidLocation`] when nothing usable remains after
/// cleaning the input.
pub fn normalize(query: &LocationQuery) -> ParseResult<NormalizedLocation> {
    match query {
        LocationQuery::City { name, country } => {
            let city = name.trim();
            if city.is_empty() {
                return Err(ParseError::InvalidLocation(
                    "city name cannot be empty".to_string(),
                ));
            }
            let country = clean_country(country.as_deref());
            let q = match country {
                Some(c) => format!("{},{}", city, c),
                None => city.to_string(),
            };
            Ok(NormalizedLocation {
                params: QueryParams::City(q),
                label: format!("City: {}, Country: {}", city, country.unwrap_or("")),
            })
        }
        LocationQuery::PostalCode { code, country } => {
            let digits: String = code.chars().filter(char::is_ascii_digit).collect();
            if digits.is_empty() {
                return Err(ParseError::InvalidLocation(format!(
                    "invalid ZIP code format: '{}'",
                    code
                )));
            }
            let country = clean_country(country.as_deref()).unwrap_or(DEFAULT_COUNTRY);
            Ok(NormalizedLocation {
                params: QueryParams::PostalCode(format!("{},{}", digits, country)),
                label: format!("ZIP: {}, Country: {}", digits, country),
            })
        }
    }
}

fn clean_country(country: Option<&str>) -> Option<&str> {
    country.map(str::trim).filter(|c| !c.is_empty())
}
