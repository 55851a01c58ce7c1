//! Error types for tidecast-core.
//!
//! # Error Handling Strategy
//!
//! Nothing in this crate retries. Callers classify errors and decide:
//!
//! | Error Type | Meaning | Typical handling |
//! |------------|---------|------------------|
//! | [`Error::Http`] | Network error or timeout | Log, report "no data" |
//! | [`Error::Status`] | Provider answered non-2xx | Log, report "no data" |
//! | [`Error::Parse`] | Provider answered with unusable data | Log, report "no data" or a payload error |
//! | [`Error::NotConfigured`] | Provider has no API key | Return an error sentinel |
//! | [`Error::InvalidConfig`] | Client could not be built | Fix configuration and restart |
//!
//! [`Error::is_provider_unavailable`] groups the first two.

use thiserror::Error;

use tidecast_types::ParseError;

/// Errors that can occur when talking to upstream providers.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Transport-level failure (connect, TLS, timeout, body read).
    #[error("{provider} request failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-success status code.
    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// The provider answered, but the body is unusable.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The provider has no credentials configured.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// The HTTP client could not be constructed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Whether this error means the provider could not be reached or refused
    /// the request, as opposed to answering with bad data.
    #[must_use]
    pub fn is_provider_unavailable(&self) -> bool {
        matches!(self, Error::Http { .. } | Error::Status { .. })
    }

    /// Whether this is a request timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Http { source, .. } if source.is_timeout())
    }
}

/// Result type alias using tidecast-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_provider_unavailable() {
        let err = Error::Status {
            provider: "OpenWeatherMap",
            status: 404,
            body: "city not found".to_string(),
        };
        assert!(err.is_provider_unavailable());
        assert!(!err.is_timeout());
        assert_eq!(
            err.to_string(),
            "OpenWeatherMap returned HTTP 404: city not found"
        );
    }

    #[test]
    fn test_parse_is_not_provider_unavailable() {
        let err: Error = ParseError::InvalidForecastPayload("empty".to_string()).into();
        assert!(!err.is_provider_unavailable());
        assert_eq!(err.to_string(), "Invalid forecast payload: empty");
    }

    #[test]
    fn test_not_configured_display() {
        let err = Error::NotConfigured("StormGlass");
        assert_eq!(err.to_string(), "StormGlass is not configured");
    }
}
