//! Application state shared across handlers.
//!
//! The store sits behind a single async mutex. Every read and write goes
//! through it, so forecast reconciliation for a location never interleaves
//! with another request's lookup-then-insert in this process.

use std::sync::Arc;

use tokio::sync::Mutex;

use tidecast_core::{MarineProvider, OpenWeatherClient, StormGlassClient, WeatherProvider};
use tidecast_store::Store;

use crate::config::Config;

/// Shared application state.
pub struct AppState {
    /// The data store (wrapped in Mutex for thread-safe access).
    pub store: Mutex<Store>,
    /// Configuration, fixed at startup.
    pub config: Config,
    /// Current conditions and forecast source.
    pub weather: Arc<dyn WeatherProvider>,
    /// Tide and sea-state source.
    pub marine: Arc<dyn MarineProvider>,
}

impl AppState {
    /// Create application state from explicit providers.
    pub fn new(
        store: Store,
        config: Config,
        weather: Arc<dyn WeatherProvider>,
        marine: Arc<dyn MarineProvider>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(store),
            config,
            weather,
            marine,
        })
    }

    /// Create application state with the real HTTP providers described by `config`.
    ///
    /// # Errors
    ///
    /// Fails if the weather API key is missing or a provider client cannot be
    /// built.
    pub fn from_config(store: Store, config: Config) -> tidecast_core::Result<Arc<Self>> {
        let weather = OpenWeatherClient::with_options(
            config.weather.api_key.as_deref().unwrap_or_default(),
            &config.weather.base_url,
            config.weather.timeout(),
        )?;
        let marine = StormGlassClient::with_options(
            config.marine.api_key.as_deref(),
            &config.marine.base_url,
            tidecast_core::stormglass::DEFAULT_TIMEOUT,
        )?;

        if !marine.is_configured() {
            tracing::warn!("No StormGlass API key configured; beach data will be unavailable");
        }

        Ok(Self::new(store, config, Arc::new(weather), Arc::new(marine)))
    }
}
