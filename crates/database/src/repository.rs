use crate::error::DbError;
use crate::loader::SeriesLoader;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{PricePoint, TimeSeries};
use sqlx::postgres::PgPool;
use sqlx::Row;

/// The `PriceRepository` reads the daily price mart from the PostgreSQL warehouse.
/// It encapsulates all SQL for the dashboard.
#[derive(Debug, Clone)]
pub struct PriceRepository {
    pool: PgPool,
    table: String,
}

impl PriceRepository {
    /// Creates a repository over `table`, which must already be a validated
    /// `[schema.]table` identifier (see `configuration::Config::validate`).
    pub fn new(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    /// Inserts (or refreshes) a batch of rows within a single transaction.
    pub async fn save_series(&self, series: &TimeSeries) -> Result<(), DbError> {
        let query = format!(
            r#"
            INSERT INTO {} (date, ticker, price, daily_return)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (ticker, date) DO UPDATE
            SET price = EXCLUDED.price, daily_return = EXCLUDED.daily_return
            "#,
            self.table
        );

        let mut tx = self.pool.begin().await?;
        for point in series.points() {
            sqlx::query(&query)
                .bind(point.date)
                .bind(&point.ticker)
                .bind(point.price)
                .bind(point.daily_return)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::debug!(ticker = series.ticker(), rows = series.len(), "saved price rows");
        Ok(())
    }
}

#[async_trait]
impl SeriesLoader for PriceRepository {
    async fn list_tickers(&self) -> Result<Vec<String>, DbError> {
        let query = format!("SELECT DISTINCT ticker FROM {} ORDER BY ticker", self.table);
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(|row| row.get("ticker")).collect())
    }

    async fn get_series(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<TimeSeries, DbError> {
        let query = format!(
            r#"
            SELECT date, ticker, price, daily_return
            FROM {}
            WHERE ticker = $1
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date <= $3)
            ORDER BY date ASC
            "#,
            self.table
        );

        let rows = sqlx::query(&query)
            .bind(ticker)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        let points: Vec<PricePoint> = rows
            .into_iter()
            .map(|row| PricePoint {
                date: row.get("date"),
                ticker: row.get("ticker"),
                price: row.get("price"),
                daily_return: row.get("daily_return"),
            })
            .collect();

        tracing::debug!(ticker, ?start, ?end, rows = points.len(), "fetched price series");
        Ok(TimeSeries::new(ticker, points)?)
    }
}
