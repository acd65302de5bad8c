use chrono::NaiveDate;
use core_types::{RangeOption, ReturnLabel};
use serde::{Deserialize, Serialize};

/// The headline KPIs for one ticker over one range.
///
/// `sharpe` and `volatility` are `None` when the statistic is undefined for the
/// window (zero variance, too few returns). A computed zero is `Some(0.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiBundle {
    pub sharpe: Option<f64>,
    pub volatility: Option<f64>,
    /// Most negative drawdown over the window, in `[-1, 0]`.
    pub max_drawdown: f64,
    pub return_value: f64,
    pub return_label: ReturnLabel,
}

/// One dated value in a chart series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Chart-ready series derived from a subject's price history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    /// Compounded growth minus one, starting at 0 on the first date.
    pub cumulative_return: Vec<SeriesPoint>,
    /// Running maximum of the growth curve, one point per daily return.
    pub running_peak: Vec<SeriesPoint>,
    /// Decline from the running peak, always `<= 0`, one point per daily return.
    pub drawdown: Vec<SeriesPoint>,
    /// Annualized trailing volatility; leading undefined windows are omitted.
    pub rolling_volatility: Vec<SeriesPoint>,
    /// Daily simple returns, one per date after the first.
    pub daily_returns: Vec<SeriesPoint>,
}

/// Everything one dashboard view needs, from a single computation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub ticker: String,
    pub benchmark: String,
    pub range: RangeOption,
    pub kpis: KpiBundle,
    pub series: DerivedSeries,
    /// The benchmark's cumulative return on the subject's date index.
    pub benchmark_cumulative_return: Vec<SeriesPoint>,
}
