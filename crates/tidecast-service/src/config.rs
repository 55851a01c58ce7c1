//! Server configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use tidecast_core::openweather;
use tidecast_core::stormglass;
use tidecast_store::RefreshPolicy;

/// Environment variable holding the OpenWeatherMap API key.
pub const ENV_WEATHER_API_KEY: &str = "OPENWEATHER_API_KEY";
/// Environment variable holding the StormGlass API key.
pub const ENV_MARINE_API_KEY: &str = "STORMGLASS_API_KEY";
/// Environment variable overriding the database path.
pub const ENV_DATABASE: &str = "TIDECAST_DATABASE";
/// Environment variable overriding the listening port.
pub const ENV_PORT: &str = "PORT";

/// Server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server settings.
    pub server: ServerConfig,
    /// Storage settings.
    pub storage: StorageConfig,
    /// Weather provider settings.
    pub weather: WeatherConfig,
    /// Tide and beach provider settings.
    pub marine: MarineConfig,
    /// Forecast window and caching.
    pub forecast: ForecastConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// Empty values are ignored. `PORT` replaces only the port part of
    /// `server.bind`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_WEATHER_API_KEY) {
            self.weather.api_key = Some(key);
        }
        if let Some(key) = get(ENV_MARINE_API_KEY) {
            self.marine.api_key = Some(key);
        }
        if let Some(path) = get(ENV_DATABASE) {
            self.storage.path = PathBuf::from(path);
        }
        if let Some(port) = get(ENV_PORT) {
            let host = self
                .server
                .bind
                .rsplit_once(':')
                .map(|(host, _)| host)
                .unwrap_or(self.server.bind.as_str());
            self.server.bind = format!("{}:{}", host, port.trim());
        }
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - Server bind address is valid (host:port format)
    /// - Storage path is not empty
    /// - A weather API key is present
    /// - Provider URLs are http(s) and the weather timeout is 1-60 seconds
    /// - The forecast window is 1-5 days
    ///
    /// # Example
    ///
    /// ```
    /// use tidecast_service::Config;
    ///
    /// let mut config = Config::default();
    /// assert!(config.validate().is_err());
    ///
    /// config.weather.api_key = Some("0123456789abcdef".to_string());
    /// config.validate().expect("config with an API key should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        errors.extend(self.server.validate());
        errors.extend(self.storage.validate());
        errors.extend(self.weather.validate());
        errors.extend(self.marine.validate());
        errors.extend(self.forecast.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load and validate configuration from a file.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:5000").
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

impl ServerConfig {
    /// Validate server configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.bind.is_empty() {
            errors.push(ValidationError::new(
                "server.bind",
                "bind address cannot be empty",
            ));
            return errors;
        }

        match self.bind.rsplit_once(':') {
            None => errors.push(ValidationError::new(
                "server.bind",
                format!(
                    "invalid bind address '{}': expected format 'host:port'",
                    self.bind
                ),
            )),
            Some((_, port)) => match port.parse::<u16>() {
                Ok(0) => errors.push(ValidationError::new("server.bind", "port cannot be 0")),
                Err(_) => errors.push(ValidationError::new(
                    "server.bind",
                    format!("invalid port '{}': must be a number 1-65535", port),
                )),
                Ok(_) => {}
            },
        }

        errors
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: tidecast_store::default_db_path(),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.path.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "storage.path",
                "database path cannot be empty",
            ));
        }

        errors
    }
}

/// Minimum weather request timeout in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 1;
/// Maximum weather request timeout in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 60;

/// OpenWeatherMap settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// API key. Required to serve weather or forecasts.
    pub api_key: Option<String>,
    /// API root.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: openweather::DEFAULT_BASE_URL.to_string(),
            timeout_secs: openweather::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &self.api_key.as_deref().map(openweather::mask_key))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl WeatherConfig {
    /// The request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate weather provider configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        match self.api_key.as_deref().map(str::trim) {
            None | Some("") => errors.push(ValidationError::new(
                "weather.api_key",
                format!(
                    "an OpenWeatherMap API key is required (set it here or via {})",
                    ENV_WEATHER_API_KEY
                ),
            )),
            Some(_) => {}
        }

        if let Some(e) = validate_url("weather.base_url", &self.base_url) {
            errors.push(e);
        }

        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            errors.push(ValidationError::new(
                "weather.timeout_secs",
                format!(
                    "timeout {} is out of range ({}-{} seconds)",
                    self.timeout_secs, MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS
                ),
            ));
        }

        errors
    }
}

/// StormGlass settings. Without a key the beach endpoint reports error
/// sentinels instead of data.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarineConfig {
    /// API key.
    pub api_key: Option<String>,
    /// API root.
    pub base_url: String,
}

impl Default for MarineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: stormglass::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl std::fmt::Debug for MarineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarineConfig")
            .field("api_key", &self.api_key.as_deref().map(openweather::mask_key))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl MarineConfig {
    /// Validate marine provider configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        validate_url("marine.base_url", &self.base_url)
            .into_iter()
            .collect()
    }
}

/// Forecast window and refresh behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of days (starting today) to keep from each forecast.
    pub days: usize,
    /// Replace stored days older than this many hours. Unset keeps the first
    /// stored forecast for a day forever.
    pub refresh_after_hours: Option<u32>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            days: tidecast_core::FORECAST_DAYS,
            refresh_after_hours: None,
        }
    }
}

impl ForecastConfig {
    /// The store refresh policy implied by `refresh_after_hours`.
    pub fn refresh_policy(&self) -> RefreshPolicy {
        match self.refresh_after_hours {
            Some(hours) => RefreshPolicy::OlderThan(time::Duration::hours(i64::from(hours))),
            None => RefreshPolicy::Never,
        }
    }

    /// Validate forecast configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !(1..=tidecast_core::FORECAST_DAYS).contains(&self.days) {
            errors.push(ValidationError::new(
                "forecast.days",
                format!(
                    "forecast days {} is out of range (1-{})",
                    self.days,
                    tidecast_core::FORECAST_DAYS
                ),
            ));
        }

        if self.refresh_after_hours == Some(0) {
            errors.push(ValidationError::new(
                "forecast.refresh_after_hours",
                "refresh interval cannot be 0 (omit it to never refresh)",
            ));
        }

        errors
    }
}

fn validate_url(field: &str, url: &str) -> Option<ValidationError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        None
    } else {
        Some(ValidationError::new(
            field,
            format!("URL must start with http:// or https://, got: '{}'", url),
        ))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `server.bind` or `weather.api_key`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tidecast")
        .join("server.toml")
}
