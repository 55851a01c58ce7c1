//! Main store implementation.

use std::path::Path;

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};
use time::{Date, Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use tidecast_types::{CurrentConditions, DailySummary};

use crate::error::{Error, Result};
use crate::models::{StoredForecast, StoredReading};
use crate::queries::{ForecastQuery, ReadingQuery};
use crate::schema;

/// SQLite-based store for readings and forecasts.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Check that the database answers queries.
    pub fn ping(&self) -> Result<()> {
        self.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<OffsetDateTime> {
    let secs: i64 = row.get(idx)?;
    OffsetDateTime::from_unix_timestamp(secs).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            Box::new(Error::InvalidTimestamp(format!("{}: {}", secs, e))),
        )
    })
}

fn reading_from_row(row: &Row<'_>) -> rusqlite::Result<StoredReading> {
    Ok(StoredReading {
        id: row.get(0)?,
        location: row.get(1)?,
        temperature: row.get(2)?,
        humidity: row.get(3)?,
        description: row.get(4)?,
        icon: row.get(5)?,
        timestamp: timestamp_at(row, 6)?,
    })
}

fn forecast_from_row(row: &Row<'_>) -> rusqlite::Result<StoredForecast> {
    Ok(StoredForecast {
        id: row.get(0)?,
        location: row.get(1)?,
        date: row.get(2)?,
        temp_min: row.get(3)?,
        temp_max: row.get(4)?,
        humidity: row.get(5)?,
        description: row.get(6)?,
        icon: row.get(7)?,
        timestamp: timestamp_at(row, 8)?,
    })
}

// Reading operations
impl Store {
    /// Append a current-conditions snapshot. Never deduplicates.
    ///
    /// The stored timestamp is the persistence time, not the provider's.
    pub fn insert_reading(&self, conditions: &CurrentConditions) -> Result<StoredReading> {
        let mut reading = StoredReading::from_conditions(conditions, now_utc_seconds());

        self.conn.execute(
            "INSERT INTO current_readings (location, temperature, humidity, description, icon, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                reading.location,
                reading.temperature,
                reading.humidity,
                reading.description,
                reading.icon,
                reading.timestamp.unix_timestamp(),
            ],
        )?;

        reading.id = self.conn.last_insert_rowid();
        debug!("Stored reading {} for {}", reading.id, reading.location);
        Ok(reading)
    }

    /// Query readings with filters.
    pub fn query_readings(&self, query: &ReadingQuery) -> Result<Vec<StoredReading>> {
        let sql = query.build_sql();
        let (_, params) = query.build_where();

        debug!("Executing query: {}", sql);

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let readings = stmt
            .query_map(params_ref.as_slice(), reading_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(readings)
    }

    /// Count readings, optionally for one location.
    pub fn count_readings(&self, location: Option<&str>) -> Result<u64> {
        let count: i64 = match location {
            Some(location) => self.conn.query_row(
                "SELECT COUNT(*) FROM current_readings WHERE location = ?",
                [location],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM current_readings", [], |row| row.get(0))?,
        };

        Ok(count as u64)
    }
}

/// When an existing daily forecast may be replaced by a fresh summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Keep the first stored record for a day forever.
    #[default]
    Never,
    /// Update a record in place once it is older than the given age.
    OlderThan(Duration),
}

impl RefreshPolicy {
    /// Whether `record` should be replaced at `now`.
    pub fn is_stale(&self, record: &StoredForecast, now: OffsetDateTime) -> bool {
        match self {
            RefreshPolicy::Never => false,
            RefreshPolicy::OlderThan(max_age) => now - record.timestamp > *max_age,
        }
    }
}

/// Result of reconciling a batch of daily summaries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    /// One record per input day, in input order.
    pub forecasts: Vec<StoredForecast>,
    /// Days that had no record and were inserted.
    pub created: usize,
    /// Days whose stale record was updated in place.
    pub refreshed: usize,
    /// Days whose existing record was returned unchanged.
    pub reused: usize,
}

impl ReconcileOutcome {
    /// Number of rows written.
    pub fn writes(&self) -> usize {
        self.created + self.refreshed
    }
}

fn find_forecast_in(conn: &Connection, location: &str, date: Date) -> Result<Option<StoredForecast>> {
    let forecast = conn
        .query_row(
            "SELECT id, location, date, temp_min, temp_max, humidity, description, icon, timestamp
             FROM daily_forecasts WHERE location = ?1 AND date = ?2",
            rusqlite::params![location, date],
            forecast_from_row,
        )
        .optional()?;

    Ok(forecast)
}

fn insert_forecast_in(
    conn: &Connection,
    location: &str,
    summary: &DailySummary,
    now: OffsetDateTime,
) -> Result<StoredForecast> {
    let mut forecast = StoredForecast::from_summary(location, summary, now);

    conn.execute(
        "INSERT INTO daily_forecasts
            (location, date, temp_min, temp_max, humidity, description, icon, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            forecast.location,
            forecast.date,
            forecast.temp_min,
            forecast.temp_max,
            forecast.humidity,
            forecast.description,
            forecast.icon,
            forecast.timestamp.unix_timestamp(),
        ],
    )?;

    forecast.id = conn.last_insert_rowid();
    Ok(forecast)
}

fn refresh_forecast_in(
    conn: &Connection,
    existing: &StoredForecast,
    summary: &DailySummary,
    now: OffsetDateTime,
) -> Result<StoredForecast> {
    let mut forecast = StoredForecast::from_summary(&existing.location, summary, now);
    forecast.id = existing.id;

    conn.execute(
        "UPDATE daily_forecasts SET
            temp_min = ?2, temp_max = ?3, humidity = ?4,
            description = ?5, icon = ?6, timestamp = ?7
         WHERE id = ?1",
        rusqlite::params![
            forecast.id,
            forecast.temp_min,
            forecast.temp_max,
            forecast.humidity,
            forecast.description,
            forecast.icon,
            forecast.timestamp.unix_timestamp(),
        ],
    )?;

    Ok(forecast)
}

// Forecast operations
impl Store {
    /// Look up the forecast for an exact location and date.
    pub fn find_forecast(&self, location: &str, date: Date) -> Result<Option<StoredForecast>> {
        find_forecast_in(&self.conn, location, date)
    }

    /// Insert a forecast without a prior lookup.
    ///
    /// Fails with [`Error::Database`] if the location already has a record for
    /// that date.
    pub fn insert_forecast(&self, location: &str, summary: &DailySummary) -> Result<StoredForecast> {
        insert_forecast_in(&self.conn, location, summary, now_utc_seconds())
    }

    /// Merge freshly computed daily summaries with what is already stored.
    ///
    /// Days are processed in input order, each in its own transaction:
    /// look up `(location, date)`, then either return the existing record,
    /// refresh it (per `policy`), or insert a new one. If a write fails, that
    /// day is rolled back and the remaining days are skipped; days committed
    /// before the failure stay committed.
    pub fn reconcile_forecasts(
        &self,
        location: &str,
        days: &[DailySummary],
        policy: RefreshPolicy,
    ) -> Result<ReconcileOutcome> {
        let now = now_utc_seconds();
        let mut outcome = ReconcileOutcome {
            forecasts: Vec::with_capacity(days.len()),
            ..Default::default()
        };

        for summary in days {
            let tx = self.conn.unchecked_transaction()?;

            let forecast = match find_forecast_in(&tx, location, summary.date)? {
                Some(existing) if policy.is_stale(&existing, now) => {
                    let refreshed = refresh_forecast_in(&tx, &existing, summary, now)
                        .inspect_err(|e| warn!("Failed to refresh {} {}: {}", location, summary.date, e))?;
                    outcome.refreshed += 1;
                    refreshed
                }
                Some(existing) => {
                    outcome.reused += 1;
                    existing
                }
                None => {
                    let created = insert_forecast_in(&tx, location, summary, now)
                        .inspect_err(|e| warn!("Failed to store {} {}: {}", location, summary.date, e))?;
                    outcome.created += 1;
                    created
                }
            };

            tx.commit()?;
            outcome.forecasts.push(forecast);
        }

        info!(
            "Reconciled {} forecast days for {} ({} created, {} refreshed, {} reused)",
            days.len(),
            location,
            outcome.created,
            outcome.refreshed,
            outcome.reused
        );
        Ok(outcome)
    }

    /// Query forecasts with filters.
    pub fn query_forecasts(&self, query: &ForecastQuery) -> Result<Vec<StoredForecast>> {
        let sql = query.build_sql();
        let (_, params) = query.build_where();

        debug!("Executing query: {}", sql);

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let forecasts = stmt
            .query_map(params_ref.as_slice(), forecast_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(forecasts)
    }

    /// Count forecasts, optionally for one location.
    pub fn count_forecasts(&self, location: Option<&str>) -> Result<u64> {
        let count: i64 = match location {
            Some(location) => self.conn.query_row(
                "SELECT COUNT(*) FROM daily_forecasts WHERE location = ?",
                [location],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM daily_forecasts", [], |row| row.get(0))?,
        };

        Ok(count as u64)
    }
}

/// Current time truncated to whole seconds, matching stored precision.
fn now_utc_seconds() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}
