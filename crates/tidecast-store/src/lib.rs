//! Local persistence for the tidecast weather backend.
//!
//! This crate provides the SQLite write-through cache behind the HTTP service.
//!
//! # Features
//!
//! - Append-only log of current-conditions snapshots
//! - One daily forecast per location and calendar date
//! - Forecast reconciliation with an explicit [`RefreshPolicy`]
//! - Query by location and time range, with pagination
//!
//! # Example
//!
//! ```
//! use tidecast_store::{RefreshPolicy, Store};
//! use tidecast_types::DailySummary;
//! use time::macros::date;
//!
//! let store = Store::open_in_memory()?;
//! let days = vec![DailySummary {
//!     date: date!(2024 - 06 - 01),
//!     temp_min: 61.0,
//!     temp_max: 74.2,
//!     humidity: 48.0,
//!     description: "Clear sky".to_string(),
//!     icon: "01d".to_string(),
//! }];
//!
//! let first = store.reconcile_forecasts("Seattle, US", &days, RefreshPolicy::Never)?;
//! let again = store.reconcile_forecasts("Seattle, US", &days, RefreshPolicy::Never)?;
//! assert_eq!(first.created, 1);
//! assert_eq!(again.created, 0);
//! assert_eq!(first.forecasts[0].id, again.forecasts[0].id);
//! # Ok::<(), tidecast_store::Error>(())
//! ```

mod error;
mod models;
mod queries;
mod schema;
mod store;

pub use error::{Error, Result};
pub use models::{StoredForecast, StoredReading};
pub use queries::{ForecastQuery, ReadingQuery};
pub use store::{ReconcileOutcome, RefreshPolicy, Store};

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/tidecast/weather.db`
/// - macOS: `~/Library/Application Support/tidecast/weather.db`
/// - Windows: `C:\Users\<user>\AppData\Local\tidecast\weather.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("tidecast")
        .join("weather.db")
}
