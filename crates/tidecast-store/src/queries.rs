//! Query builders for readings and forecasts.
//!
//! Both [`ReadingQuery`] and [`ForecastQuery`] follow the builder pattern and
//! default to newest first.
//!
//! # Example
//!
//! ```
//! use tidecast_store::{Store, ReadingQuery, ForecastQuery};
//! use time::{Duration, OffsetDateTime};
//!
//! let store = Store::open_in_memory()?;
//! let yesterday = OffsetDateTime::now_utc() - Duration::hours(24);
//!
//! let readings = store.query_readings(
//!     &ReadingQuery::new()
//!         .location("Seattle, US")
//!         .since(yesterday)
//!         .limit(10),
//! )?;
//!
//! let forecasts = store.query_forecasts(
//!     &ForecastQuery::new()
//!         .location("Seattle, US")
//!         .from_date(yesterday.date())
//!         .oldest_first(),
//! )?;
//! # Ok::<(), tidecast_store::Error>(())
//! ```

use time::{Date, OffsetDateTime};

/// Fluent query builder for current readings.
///
/// Use this to construct queries for [`Store::query_readings`](crate::Store::query_readings).
/// Results are ordered by `timestamp` descending unless [`oldest_first`](Self::oldest_first)
/// is set; rows persisted within the same second keep insertion order.
#[derive(Debug, Default, Clone)]
pub struct ReadingQuery {
    /// Filter by exact location label.
    pub location: Option<String>,
    /// Filter readings persisted at or after this time.
    pub since: Option<OffsetDateTime>,
    /// Filter readings persisted at or before this time.
    pub until: Option<OffsetDateTime>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
    /// Order by timestamp descending (newest first).
    pub newest_first: bool,
}

impl ReadingQuery {
    /// Create a new query: all locations, no time range, no limit, newest first.
    pub fn new() -> Self {
        Self {
            newest_first: true,
            ..Default::default()
        }
    }

    /// Filter by location label.
    pub fn location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    /// Filter to readings persisted at or after this time.
    pub fn since(mut self, time: OffsetDateTime) -> Self {
        self.since = Some(time);
        self
    }

    /// Filter to readings persisted at or before this time.
    pub fn until(mut self, time: OffsetDateTime) -> Self {
        self.until = Some(time);
        self
    }

    /// Limit the maximum number of results returned.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first N results.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Order results chronologically.
    pub fn oldest_first(mut self) -> Self {
        self.newest_first = false;
        self
    }

    /// Build the SQL WHERE clause and parameters.
    pub(crate) fn build_where(&self) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref location) = self.location {
            conditions.push("location = ?");
            params.push(Box::new(location.clone()));
        }

        if let Some(since) = self.since {
            conditions.push("timestamp >= ?");
            params.push(Box::new(since.unix_timestamp()));
        }

        if let Some(until) = self.until {
            conditions.push("timestamp <= ?");
            params.push(Box::new(until.unix_timestamp()));
        }

        (where_clause(&conditions), params)
    }

    /// Build the full SQL query.
    pub(crate) fn build_sql(&self) -> String {
        let (where_clause, _) = self.build_where();
        let order = if self.newest_first { "DESC" } else { "ASC" };

        let mut sql = format!(
            "SELECT id, location, temperature, humidity, description, icon, timestamp \
             FROM current_readings {} ORDER BY timestamp {}, id {}",
            where_clause, order, order
        );
        push_pagination(&mut sql, self.limit, self.offset);
        sql
    }
}

/// Fluent query builder for daily forecasts.
///
/// Use this to construct queries for [`Store::query_forecasts`](crate::Store::query_forecasts).
/// Results are ordered by `date` descending unless [`oldest_first`](Self::oldest_first)
/// is set.
#[derive(Debug, Default, Clone)]
pub struct ForecastQuery {
    /// Filter by exact location label.
    pub location: Option<String>,
    /// Include only dates on or after this one.
    pub from_date: Option<Date>,
    /// Include only dates on or before this one.
    pub to_date: Option<Date>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
    /// Order by date descending (newest first).
    pub newest_first: bool,
}

impl ForecastQuery {
    /// Create a new query: all locations, all dates, no limit, newest first.
    pub fn new() -> Self {
        Self {
            newest_first: true,
            ..Default::default()
        }
    }

    /// Filter by location label.
    pub fn location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    /// Include only dates on or after `date`.
    pub fn from_date(mut self, date: Date) -> Self {
        self.from_date = Some(date);
        self
    }

    /// Include only dates on or before `date`.
    pub fn to_date(mut self, date: Date) -> Self {
        self.to_date = Some(date);
        self
    }

    /// Limit the maximum number of results returned.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first N results.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Order results by ascending date.
    pub fn oldest_first(mut self) -> Self {
        self.newest_first = false;
        self
    }

    pub(crate) fn build_where(&self) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref location) = self.location {
            conditions.push("location = ?");
            params.push(Box::new(location.clone()));
        }

        // Dates are stored as ISO-8601 text, which sorts chronologically.
        if let Some(from) = self.from_date {
            conditions.push("date >= ?");
            params.push(Box::new(from));
        }

        if let Some(to) = self.to_date {
            conditions.push("date <= ?");
            params.push(Box::new(to));
        }

        (where_clause(&conditions), params)
    }

    pub(crate) fn build_sql(&self) -> String {
        let (where_clause, _) = self.build_where();
        let order = if self.newest_first { "DESC" } else { "ASC" };

        let mut sql = format!(
            "SELECT id, location, date, temp_min, temp_max, humidity, description, icon, timestamp \
             FROM daily_forecasts {} ORDER BY date {}, location ASC",
            where_clause, order
        );
        push_pagination(&mut sql, self.limit, self.offset);
        sql
    }
}

fn where_clause(conditions: &[&str]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

fn push_pagination(sql: &mut String, limit: Option<u32>, offset: Option<u32>) {
    match (limit, offset) {
        (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset)),
        (Some(limit), None) => sql.push_str(&format!(" LIMIT {}", limit)),
        // SQLite requires a LIMIT before OFFSET
        (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
        (None, None) => {}
    }
}
