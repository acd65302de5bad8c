use crate::error::DbError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{PricePoint, TimeSeries};
use std::collections::BTreeMap;
use std::path::Path;

/// The abstract source of daily price histories.
///
/// The CLI and the web server only ever talk to this trait, so the warehouse
/// adapter and the fixture-backed loader can be swapped freely.
#[async_trait]
pub trait SeriesLoader: Send + Sync {
    /// All tickers with at least one row, distinct and sorted ascending.
    async fn list_tickers(&self) -> Result<Vec<String>, DbError>;

    /// The ticker's rows between `start` and `end` (both inclusive when given),
    /// ordered by date. An unknown ticker yields an empty series.
    async fn get_series(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<TimeSeries, DbError>;
}

/// A loader backed by rows held in memory, e.g. from a JSON fixture file.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    rows: BTreeMap<String, BTreeMap<NaiveDate, PricePoint>>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a loader from arbitrary rows. A later row for the same
    /// ticker and date replaces an earlier one.
    pub fn from_points(points: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut loader = Self::new();
        for point in points {
            loader.insert(point);
        }
        loader
    }

    /// Reads a JSON array of `{date, ticker, price, daily_return}` rows.
    pub fn from_json_file(path: &Path) -> Result<Self, DbError> {
        let raw = std::fs::read_to_string(path)?;
        let points: Vec<PricePoint> = serde_json::from_str(&raw)?;
        tracing::info!(path = %path.display(), rows = points.len(), "loaded price fixture");
        Ok(Self::from_points(points))
    }

    pub fn insert(&mut self, point: PricePoint) {
        self.rows
            .entry(point.ticker.clone())
            .or_default()
            .insert(point.date, point);
    }

    /// Adds every row of a series.
    pub fn insert_series(&mut self, series: &TimeSeries) {
        for point in series.points() {
            self.insert(point.clone());
        }
    }
}

#[async_trait]
impl SeriesLoader for InMemoryLoader {
    async fn list_tickers(&self) -> Result<Vec<String>, DbError> {
        Ok(self.rows.keys().cloned().collect())
    }

    async fn get_series(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<TimeSeries, DbError> {
        let Some(by_date) = self.rows.get(ticker) else {
            return Ok(TimeSeries::empty(ticker));
        };

        let points: Vec<PricePoint> = by_date
            .values()
            .filter(|p| start.is_none_or(|s| p.date >= s) && end.is_none_or(|e| p.date <= e))
            .cloned()
            .collect();

        Ok(TimeSeries::new(ticker, points)?)
    }
}
