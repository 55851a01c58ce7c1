//! Error types for data parsing in tidecast-types.

use thiserror::Error;

/// Errors raised while turning user input or provider payloads into domain types.
///
/// None of these are transport failures; those belong in tidecast-core.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// The location query cannot be turned into an upstream query.
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// The current-conditions response is structurally unusable.
    #[error("Invalid provider response: {0}")]
    InvalidProviderResponse(String),

    /// The forecast response is empty or structurally unusable.
    #[error("Invalid forecast payload: {0}")]
    InvalidForecastPayload(String),
}

/// Result type alias using tidecast-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
