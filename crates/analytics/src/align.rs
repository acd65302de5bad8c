use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::TimeSeries;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

/// A subject and benchmark price history sharing the subject's date index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedPair {
    pub dates: Vec<NaiveDate>,
    pub subject: Vec<f64>,
    /// `None` until the benchmark's first observation on or before the date.
    pub benchmark: Vec<Option<f64>>,
}

impl AlignedPair {
    /// Number of leading subject dates with no benchmark value yet.
    pub fn leading_benchmark_gap(&self) -> usize {
        self.benchmark.iter().take_while(|b| b.is_none()).count()
    }
}

/// Reindexes `benchmark` onto `subject`'s dates, forward-filling gaps.
///
/// Each subject date takes the last benchmark price observed on or before it.
/// Benchmark dates that the subject does not trade on are dropped.
pub fn align(subject: &TimeSeries, benchmark: &TimeSeries) -> Result<AlignedPair, AnalyticsError> {
    let subject_prices = prices_of(subject)?;
    let bench_prices = prices_of(benchmark)?;
    let bench_dates: Vec<NaiveDate> = benchmark.dates().collect();

    let mut aligned = Vec::with_capacity(subject.len());
    let mut last_seen: Option<f64> = None;
    let mut j = 0;

    for date in subject.dates() {
        while j < bench_dates.len() && bench_dates[j] <= date {
            last_seen = Some(bench_prices[j]);
            j += 1;
        }
        aligned.push(last_seen);
    }

    Ok(AlignedPair {
        dates: subject.dates().collect(),
        subject: subject_prices,
        benchmark: aligned,
    })
}

/// Converts the series' decimal prices into floats for the statistics.
pub(crate) fn prices_of(series: &TimeSeries) -> Result<Vec<f64>, AnalyticsError> {
    series
        .points()
        .iter()
        .map(|p| {
            p.price.to_f64().ok_or_else(|| {
                AnalyticsError::Calculation(format!(
                    "price {} for {} on {} does not fit in f64",
                    p.price, p.ticker, p.date
                ))
            })
        })
        .collect()
}
