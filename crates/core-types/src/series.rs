use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single daily observation for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub ticker: String,
    pub price: Decimal,
    /// Fractional change against the previous observation. `None` on the first row.
    pub daily_return: Option<Decimal>,
}

/// An ordered, date-indexed price history for a single ticker.
///
/// Dates are strictly increasing and every price is positive. Gaps (weekends,
/// holidays) are simply absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeriesRows")]
pub struct TimeSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

/// Unchecked wire form of a `TimeSeries`.
#[derive(Deserialize)]
struct SeriesRows {
    ticker: String,
    points: Vec<PricePoint>,
}

impl TryFrom<SeriesRows> for TimeSeries {
    type Error = CoreError;

    fn try_from(rows: SeriesRows) -> Result<Self, Self::Error> {
        TimeSeries::new(rows.ticker, rows.points)
    }
}

impl TimeSeries {
    /// Builds a series from rows already in date order, validating the invariants.
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, CoreError> {
        let ticker = ticker.into();

        for point in &points {
            if point.price <= Decimal::ZERO {
                return Err(CoreError::InvalidInput(
                    "price".to_string(),
                    format!("{} on {} is not positive ({})", ticker, point.date, point.price),
                ));
            }
        }

        if let Some(w) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(CoreError::InvalidInput(
                "date".to_string(),
                format!("{} is not strictly after {} for {}", w[1].date, w[0].date, ticker),
            ));
        }

        Ok(Self { ticker, points })
    }

    /// An empty series; what a loader returns when nothing matches.
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            points: Vec::new(),
        }
    }

    /// Builds a series from `(date, price)` pairs, filling each row's daily return
    /// from the previous price.
    pub fn from_prices(
        ticker: impl Into<String>,
        prices: impl IntoIterator<Item = (NaiveDate, Decimal)>,
    ) -> Result<Self, CoreError> {
        let ticker = ticker.into();
        let mut points: Vec<PricePoint> = Vec::new();
        let mut previous: Option<Decimal> = None;

        for (date, price) in prices {
            let daily_return = match previous {
                Some(prev) if !prev.is_zero() => Some(price / prev - Decimal::ONE),
                _ => None,
            };
            points.push(PricePoint {
                date,
                ticker: ticker.clone(),
                price,
                daily_return,
            });
            previous = Some(price);
        }

        Self::new(ticker, points)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}
