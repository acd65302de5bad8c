use crate::align::{AlignedPair, align, prices_of};
use crate::error::AnalyticsError;
use crate::params::MetricsParams;
use crate::report::{Dashboard, DerivedSeries, KpiBundle, SeriesPoint};
use crate::stats::{mean, pct_change, sample_std_dev};
use chrono::NaiveDate;
use core_types::{RangeOption, ReturnLabel, TimeSeries};
use tracing::debug;

/// A stateless calculator for the dashboard's performance metrics.
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    params: MetricsParams,
}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: MetricsParams) -> Self {
        Self { params }
    }

    /// Computes the KPI bundle for `subject` over the selected `range`.
    ///
    /// # Errors
    ///
    /// `AnalyticsError::InsufficientData` if either series is empty. Degenerate
    /// statistics never error; they come back as `None`.
    pub fn compute_kpis(
        &self,
        subject: &TimeSeries,
        benchmark: &TimeSeries,
        range: RangeOption,
    ) -> Result<KpiBundle, AnalyticsError> {
        ensure_not_empty(subject, "subject")?;
        ensure_not_empty(benchmark, "benchmark")?;

        let prices = prices_of(subject)?;
        let returns = pct_change(&prices);
        let dates: Vec<NaiveDate> = subject.dates().collect();

        let (_, drawdown) = drawdown_curve(&growth_curve(&returns));
        let max_drawdown = drawdown.iter().copied().fold(0.0_f64, f64::min);

        let (return_label, return_value) = self.headline_return(&prices, &dates, range);

        Ok(KpiBundle {
            sharpe: self.sharpe_ratio(&returns),
            volatility: self.volatility(&returns),
            max_drawdown,
            return_value,
            return_label,
        })
    }

    /// Builds the chart series for `subject`: cumulative return, running peak,
    /// drawdown, rolling volatility and daily returns.
    ///
    /// An empty subject yields empty series.
    pub fn compute_derived_series(
        &self,
        subject: &TimeSeries,
    ) -> Result<DerivedSeries, AnalyticsError> {
        let prices = prices_of(subject)?;
        let returns = pct_change(&prices);
        let dates: Vec<NaiveDate> = subject.dates().collect();
        let return_dates = dates.get(1..).unwrap_or_default();

        let growth = growth_curve(&returns);
        let (peak, drawdown) = drawdown_curve(&growth);
        let cumulative = std::iter::once(0.0).chain(growth.iter().map(|g| g - 1.0));

        Ok(DerivedSeries {
            cumulative_return: zip_points(&dates, cumulative),
            running_peak: zip_points(return_dates, peak),
            drawdown: zip_points(return_dates, drawdown),
            rolling_volatility: self.rolling_volatility(return_dates, &returns),
            daily_returns: zip_points(return_dates, returns.iter().copied()),
        })
    }

    /// Runs one full dashboard pass: validation, alignment, KPIs and series.
    pub fn analyze(
        &self,
        subject: &TimeSeries,
        benchmark: &TimeSeries,
        range: RangeOption,
    ) -> Result<Dashboard, AnalyticsError> {
        let kpis = self.compute_kpis(subject, benchmark, range)?;
        let aligned = align(subject, benchmark)?;
        let series = self.compute_derived_series(subject)?;

        debug!(
            ticker = subject.ticker(),
            benchmark = benchmark.ticker(),
            range = %range,
            observations = subject.len(),
            leading_benchmark_gap = aligned.leading_benchmark_gap(),
            "computed dashboard metrics"
        );

        Ok(Dashboard {
            ticker: subject.ticker().to_string(),
            benchmark: benchmark.ticker().to_string(),
            range,
            kpis,
            series,
            benchmark_cumulative_return: benchmark_cumulative_return(&aligned),
        })
    }

    /// Annualized Sharpe ratio of daily returns in excess of the daily risk-free rate.
    fn sharpe_ratio(&self, returns: &[f64]) -> Option<f64> {
        let rf_daily = self.params.daily_risk_free_rate();
        let excess: Vec<f64> = returns.iter().map(|r| r - rf_daily).collect();

        let std_dev = sample_std_dev(&excess)?;
        if std_dev == 0.0 {
            return None;
        }
        Some(mean(&excess)? / std_dev * self.params.annualization_factor())
    }

    fn volatility(&self, returns: &[f64]) -> Option<f64> {
        sample_std_dev(returns).map(|s| s * self.params.annualization_factor())
    }

    /// Period return for the shortest range, CAGR for every longer one.
    fn headline_return(
        &self,
        prices: &[f64],
        dates: &[NaiveDate],
        range: RangeOption,
    ) -> (ReturnLabel, f64) {
        let label = range.return_label();
        let (first, last) = match (prices.first(), prices.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return (label, 0.0),
        };
        let ratio = last / first;

        match label {
            ReturnLabel::PeriodReturn => (label, ratio - 1.0),
            ReturnLabel::Cagr => {
                let days = match (dates.first(), dates.last()) {
                    (Some(start), Some(end)) => (*end - *start).num_days(),
                    _ => 0,
                };
                let years = (days as f64 / self.params.calendar_days_per_year)
                    .max(self.params.min_years);
                (label, ratio.powf(1.0 / years) - 1.0)
            }
        }
    }

    /// Trailing-window annualized volatility, dated at each window's last return.
    fn rolling_volatility(&self, dates: &[NaiveDate], returns: &[f64]) -> Vec<SeriesPoint> {
        let window = self.params.rolling_window.min(returns.len());
        let min_periods = self.params.rolling_min_periods;
        let factor = self.params.annualization_factor();

        (0..returns.len())
            .filter_map(|i| {
                let start = (i + 1).saturating_sub(window);
                let slice = &returns[start..=i];
                if slice.len() < min_periods {
                    return None;
                }
                sample_std_dev(slice).map(|s| SeriesPoint::new(dates[i], s * factor))
            })
            .collect()
    }
}

fn ensure_not_empty(series: &TimeSeries, role: &str) -> Result<(), AnalyticsError> {
    if series.is_empty() {
        return Err(AnalyticsError::InsufficientData(format!(
            "{} ({})",
            role,
            series.ticker()
        )));
    }
    Ok(())
}

/// Compounded growth after each return, seeded at 1 before the first one.
///
/// One entry per return, so the first price never counts as a peak.
fn growth_curve(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |level, r| {
            *level *= 1.0 + r;
            Some(*level)
        })
        .collect()
}

/// Running peak and drawdown from peak for a growth curve.
fn drawdown_curve(growth: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut peaks = Vec::with_capacity(growth.len());
    let mut drawdowns = Vec::with_capacity(growth.len());
    let mut peak = f64::MIN;

    for &g in growth {
        peak = peak.max(g);
        peaks.push(peak);
        drawdowns.push((g - peak) / peak);
    }
    (peaks, drawdowns)
}

fn benchmark_cumulative_return(aligned: &AlignedPair) -> Vec<SeriesPoint> {
    let Some(base) = aligned.benchmark.iter().flatten().next().copied() else {
        return Vec::new();
    };
    aligned
        .dates
        .iter()
        .zip(&aligned.benchmark)
        .filter_map(|(date, price)| price.map(|p| SeriesPoint::new(*date, p / base - 1.0)))
        .collect()
}

fn zip_points(dates: &[NaiveDate], values: impl IntoIterator<Item = f64>) -> Vec<SeriesPoint> {
    dates
        .iter()
        .zip(values)
        .map(|(date, value)| SeriesPoint::new(*date, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use chrono::Duration;
    use rust_decimal::Decimal;
    use rust_decimal::prelude::FromPrimitive;
    use rust_decimal_macros::dec;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
    }

    /// One observation per calendar day starting at `start()`.
    fn daily(ticker: &str, prices: &[f64]) -> TimeSeries {
        TimeSeries::from_prices(
            ticker,
            prices.iter().enumerate().map(|(i, p)| {
                (start() + Duration::days(i as i64), Decimal::from_f64(*p).unwrap())
            }),
        )
        .unwrap()
    }

    fn dated(ticker: &str, rows: &[(i64, f64)]) -> TimeSeries {
        TimeSeries::from_prices(
            ticker,
            rows.iter().map(|(offset, p)| {
                (start() + Duration::days(*offset), Decimal::from_f64(*p).unwrap())
            }),
        )
        .unwrap()
    }

    fn wavy_prices(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + 10.0 * ((i as f64) * 0.7).sin() + i as f64 * 0.2).collect()
    }

    fn benchmark() -> TimeSeries {
        daily("^GSPC", &[4000.0, 4010.0, 3990.0, 4020.0])
    }

    #[test]
    fn four_price_scenario() {
        let engine = MetricsEngine::new();
        let subject = daily("AAPL", &[100.0, 102.0, 101.0, 105.0]);

        let kpis = engine
            .compute_kpis(&subject, &benchmark(), RangeOption::OneMonth)
            .unwrap();
        let series = engine.compute_derived_series(&subject).unwrap();

        let final_cum = series.cumulative_return.last().unwrap().value;
        assert_relative_eq!(final_cum, 0.05, max_relative = 1e-12);
        assert_relative_eq!(kpis.max_drawdown, 101.0 / 102.0 - 1.0, max_relative = 1e-12);
        assert_relative_eq!(kpis.max_drawdown, -0.009_803_921_568_627_45, max_relative = 1e-9);
        assert!(kpis.sharpe.is_some_and(f64::is_finite));
        assert!(kpis.volatility.is_some_and(|v| v > 0.0));
        assert_eq!(kpis.return_label, ReturnLabel::PeriodReturn);
        assert_relative_eq!(kpis.return_value, 0.05, max_relative = 1e-12);
    }

    #[test]
    fn sharpe_and_volatility_follow_the_daily_conventions() {
        let engine = MetricsEngine::new();
        let subject = daily("AAPL", &[100.0, 110.0, 99.0]);

        let kpis = engine.compute_kpis(&subject, &benchmark(), RangeOption::OneYear).unwrap();

        let rf_daily = 0.04 / 252.0;
        let std = 0.02_f64.sqrt();
        let annualize = 252.0_f64.sqrt();
        assert_relative_eq!(kpis.sharpe.unwrap(), -rf_daily / std * annualize, max_relative = 1e-9);
        assert_relative_eq!(kpis.volatility.unwrap(), std * annualize, max_relative = 1e-9);
    }

    #[test]
    fn single_flat_return_is_undefined_not_zero() {
        let engine = MetricsEngine::new();
        let subject = daily("FLAT", &[50.0, 50.0]);

        let kpis = engine.compute_kpis(&subject, &benchmark(), RangeOption::OneMonth).unwrap();

        assert_eq!(kpis.sharpe, None);
        assert_eq!(kpis.volatility, None);
        assert_eq!(kpis.max_drawdown, 0.0);
        assert_eq!(kpis.return_value, 0.0);
    }

    #[test]
    fn constant_prices_give_zero_volatility_and_undefined_sharpe() {
        let engine = MetricsEngine::new();
        let subject = daily("FLAT", &[50.0, 50.0, 50.0]);

        let kpis = engine.compute_kpis(&subject, &benchmark(), RangeOption::SixMonths).unwrap();

        assert_eq!(kpis.volatility, Some(0.0));
        assert_eq!(kpis.sharpe, None);
        assert_eq!(kpis.max_drawdown, 0.0);
        assert_eq!(kpis.return_value, 0.0);
        assert_eq!(kpis.return_label, ReturnLabel::Cagr);
    }

    #[test]
    fn tiny_but_nonzero_variance_still_has_a_sharpe_ratio() {
        let engine = MetricsEngine::new();
        let subject = TimeSeries::from_prices(
            "STILL",
            vec![
                (start(), dec!(100)),
                (start() + Duration::days(1), dec!(100.00000000001)),
                (start() + Duration::days(2), dec!(100)),
            ],
        )
        .unwrap();

        let kpis = engine
            .compute_kpis(&subject, &benchmark(), RangeOption::OneMonth)
            .unwrap();

        assert!(kpis.volatility.is_some_and(|v| v > 0.0 && v < 1e-9));
        assert!(kpis.sharpe.is_some_and(f64::is_finite));
    }

    #[test]
    fn single_observation_is_not_an_error() {
        let engine = MetricsEngine::new();
        let subject = daily("ONE", &[42.0]);

        let kpis = engine.compute_kpis(&subject, &benchmark(), RangeOption::FiveYears).unwrap();

        assert_eq!(kpis.sharpe, None);
        assert_eq!(kpis.volatility, None);
        assert_eq!(kpis.max_drawdown, 0.0);
        assert_eq!(kpis.return_value, 0.0);
    }

    #[test]
    fn empty_inputs_are_insufficient_data() {
        let engine = MetricsEngine::new();
        let subject = daily("AAPL", &[1.0, 2.0]);

        let err = engine
            .compute_kpis(&TimeSeries::empty("AAPL"), &benchmark(), RangeOption::OneYear)
            .unwrap_err();
        assert!(matches!(&err, AnalyticsError::InsufficientData(w) if w.starts_with("subject")));

        let err = engine
            .compute_kpis(&subject, &TimeSeries::empty("^GSPC"), RangeOption::OneYear)
            .unwrap_err();
        assert!(matches!(&err, AnalyticsError::InsufficientData(w) if w.starts_with("benchmark")));

        let empty = TimeSeries::empty("^GSPC");
        assert!(engine.analyze(&subject, &empty, RangeOption::OneYear).is_err());
    }

    #[test]
    fn one_month_range_reports_period_return() {
        let engine = MetricsEngine::new();
        let subject = dated("AAPL", &[(0, 100.0), (15, 104.0), (30, 110.0)]);

        let kpis = engine.compute_kpis(&subject, &benchmark(), RangeOption::OneMonth).unwrap();

        assert_eq!(kpis.return_label, ReturnLabel::PeriodReturn);
        assert_relative_eq!(kpis.return_value, 0.1, max_relative = 1e-12);
    }

    #[test]
    fn three_year_range_reports_cagr() {
        let engine = MetricsEngine::new();
        let subject = dated("AAPL", &[(0, 100.0), (500, 120.0), (1095, 133.1)]);

        let kpis = engine
            .compute_kpis(&subject, &benchmark(), RangeOption::ThreeYears)
            .unwrap();

        assert_eq!(kpis.return_label, ReturnLabel::Cagr);
        assert_relative_eq!(kpis.return_value, 0.1, max_relative = 1e-9);
    }

    #[test]
    fn cagr_year_count_is_floored() {
        let engine = MetricsEngine::new();
        let subject = daily("AAPL", &[100.0, 101.0]);

        let kpis = engine.compute_kpis(&subject, &benchmark(), RangeOption::OneYear).unwrap();

        assert_eq!(kpis.return_label, ReturnLabel::Cagr);
        assert_relative_eq!(kpis.return_value, 1.01_f64.powf(100.0) - 1.0, max_relative = 1e-9);
    }

    #[test]
    fn cumulative_return_reconstructs_prices() {
        let engine = MetricsEngine::new();
        let prices = wavy_prices(60);
        let subject = daily("WAVE", &prices);

        let series = engine.compute_derived_series(&subject).unwrap();

        assert_eq!(series.cumulative_return.len(), prices.len());
        assert_eq!(series.cumulative_return[0].value, 0.0);
        for (point, price) in series.cumulative_return.iter().zip(&prices) {
            assert_relative_eq!(prices[0] * (1.0 + point.value), *price, max_relative = 1e-9);
        }
        let dates: Vec<_> = subject.dates().collect();
        let series_dates: Vec<_> = series.cumulative_return.iter().map(|p| p.date).collect();
        assert_eq!(series_dates, dates);
    }

    #[test]
    fn drawdown_is_never_positive() {
        let engine = MetricsEngine::new();
        let subject = daily("WAVE", &wavy_prices(90));

        let kpis = engine.compute_kpis(&subject, &benchmark(), RangeOption::OneYear).unwrap();
        let series = engine.compute_derived_series(&subject).unwrap();

        assert!(series.drawdown.iter().all(|p| p.value <= 0.0 && p.value >= -1.0));
        assert!(kpis.max_drawdown < 0.0);
        let min = series.drawdown.iter().map(|p| p.value).fold(0.0, f64::min);
        assert_eq!(kpis.max_drawdown, min);
        assert_eq!(series.drawdown.len(), series.daily_returns.len());
        for (peak, cum) in series.running_peak.iter().zip(&series.cumulative_return[1..]) {
            assert_eq!(peak.date, cum.date);
            assert!(peak.value >= 1.0 + cum.value - 1e-12);
        }
    }

    #[test]
    fn drawdown_is_zero_for_non_decreasing_prices() {
        let engine = MetricsEngine::new();
        let subject = daily("UP", &[10.0, 10.0, 11.0, 12.5, 12.5, 13.0]);

        let kpis = engine.compute_kpis(&subject, &benchmark(), RangeOption::OneYear).unwrap();
        let series = engine.compute_derived_series(&subject).unwrap();

        assert_eq!(kpis.max_drawdown, 0.0);
        assert!(series.drawdown.iter().all(|p| p.value == 0.0));
    }

    #[test]
    fn first_price_is_not_a_drawdown_peak() {
        let engine = MetricsEngine::new();
        let subject = daily("DIP", &[100.0, 90.0, 95.0]);

        let kpis = engine.compute_kpis(&subject, &benchmark(), RangeOption::OneYear).unwrap();
        let series = engine.compute_derived_series(&subject).unwrap();

        // Growth is [0.9, 0.95]: it never declines once returns begin.
        assert_eq!(kpis.max_drawdown, 0.0);
        assert!(series.drawdown.iter().all(|p| p.value == 0.0));
        assert_eq!(series.drawdown[0].date, start() + Duration::days(1));
        assert_relative_eq!(series.running_peak[1].value, 0.95, max_relative = 1e-12);
        assert_relative_eq!(series.cumulative_return[1].value, -0.1, max_relative = 1e-12);
    }

    #[test]
    fn rolling_volatility_waits_for_five_returns() {
        let engine = MetricsEngine::new();
        let prices = wavy_prices(40);
        let subject = daily("WAVE", &prices);

        let series = engine.compute_derived_series(&subject).unwrap();

        // 39 returns; the first four windows are too short.
        assert_eq!(series.rolling_volatility.len(), 35);
        assert!(series.rolling_volatility.len() <= prices.len());
        assert_eq!(series.rolling_volatility[0].date, start() + Duration::days(5));
        assert!(
            series
                .rolling_volatility
                .iter()
                .all(|p| p.value.is_finite() && p.value >= 0.0)
        );
    }

    #[test]
    fn rolling_volatility_window_is_capped_at_thirty() {
        let engine = MetricsEngine::new();
        let prices = wavy_prices(45);
        let subject = daily("WAVE", &prices);

        let series = engine.compute_derived_series(&subject).unwrap();
        let returns = pct_change(&prices);
        let last_window = &returns[returns.len() - 30..];
        let expected = sample_std_dev(last_window).unwrap() * 252.0_f64.sqrt();

        let last = series.rolling_volatility.last().unwrap();
        assert_relative_eq!(last.value, expected, max_relative = 1e-12);
    }

    #[test]
    fn rolling_volatility_is_empty_below_minimum_sample() {
        let engine = MetricsEngine::new();
        let subject = daily("SHORT", &[1.0, 1.1, 1.2, 1.15, 1.3]);

        let series = engine.compute_derived_series(&subject).unwrap();

        assert_eq!(series.daily_returns.len(), 4);
        assert!(series.rolling_volatility.is_empty());
    }

    #[test]
    fn short_window_rolling_point_matches_headline_volatility() {
        let engine = MetricsEngine::new();
        let subject = daily("SIX", &[1.0, 1.1, 1.2, 1.15, 1.3, 1.25]);

        let kpis = engine
            .compute_kpis(&subject, &benchmark(), RangeOption::OneMonth)
            .unwrap();
        let series = engine.compute_derived_series(&subject).unwrap();

        assert_eq!(series.rolling_volatility.len(), 1);
        let rolling = series.rolling_volatility[0].value;
        assert_abs_diff_eq!(rolling, kpis.volatility.unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn analyze_forward_fills_the_benchmark_curve() {
        let engine = MetricsEngine::new();
        let subject = dated("AAPL", &[(0, 10.0), (1, 11.0), (2, 12.0), (3, 12.5)]);
        let bench = dated("^GSPC", &[(1, 200.0), (3, 220.0)]);

        let dashboard = engine.analyze(&subject, &bench, RangeOption::OneMonth).unwrap();

        assert_eq!(dashboard.ticker, "AAPL");
        assert_eq!(dashboard.benchmark, "^GSPC");
        assert_eq!(dashboard.range, RangeOption::OneMonth);
        let curve: Vec<_> = dashboard
            .benchmark_cumulative_return
            .iter()
            .map(|p| ((p.date - start()).num_days(), p.value))
            .collect();
        assert_eq!(curve.len(), 3);
        assert_eq!(curve[0], (1, 0.0));
        assert_eq!(curve[1], (2, 0.0));
        assert_eq!(curve[2].0, 3);
        assert_relative_eq!(curve[2].1, 0.1, max_relative = 1e-12);
    }

    #[test]
    fn custom_params_change_the_annualization() {
        let params = MetricsParams {
            risk_free_rate: 0.0,
            trading_days_per_year: 365.0,
            ..MetricsParams::default()
        };
        let engine = MetricsEngine::with_params(params);
        let subject = daily("AAPL", &[100.0, 110.0, 99.0]);

        let kpis = engine.compute_kpis(&subject, &benchmark(), RangeOption::OneYear).unwrap();

        let expected = 0.02_f64.sqrt() * 365.0_f64.sqrt();
        assert_relative_eq!(kpis.volatility.unwrap(), expected, max_relative = 1e-9);
    }

    #[test]
    fn dashboard_serializes_undefined_metrics_as_null() {
        let engine = MetricsEngine::new();
        let subject = daily("FLAT", &[50.0, 50.0]);

        let dashboard = engine
            .analyze(&subject, &benchmark(), RangeOption::OneMonth)
            .unwrap();
        let json = serde_json::to_value(&dashboard).unwrap();

        assert!(json["kpis"]["sharpe"].is_null());
        assert!(json["kpis"]["volatility"].is_null());
        assert_eq!(json["kpis"]["return_label"], "Period Return");
        assert_eq!(json["range"], "1M");
    }
}
