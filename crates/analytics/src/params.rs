use serde::{Deserialize, Serialize};

/// Numeric conventions used by the engine.
///
/// The defaults are the dashboard's published conventions; configuration may
/// override them but nothing else in the system assumes different values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsParams {
    /// Annual risk-free rate subtracted from daily returns for the Sharpe ratio.
    pub risk_free_rate: f64,
    /// Trading days per year, used for de-annualizing the risk-free rate and
    /// annualizing every standard deviation.
    pub trading_days_per_year: f64,
    /// Calendar days per year, used to convert a date span into years for CAGR.
    pub calendar_days_per_year: f64,
    /// Floor on the CAGR exponent's year count.
    pub min_years: f64,
    /// Upper bound on the trailing window for rolling volatility.
    pub rolling_window: usize,
    /// Observations a rolling window needs before it produces a point.
    pub rolling_min_periods: usize,
}

impl Default for MetricsParams {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.04,
            trading_days_per_year: 252.0,
            calendar_days_per_year: 365.0,
            min_years: 0.01,
            rolling_window: 30,
            rolling_min_periods: 5,
        }
    }
}

impl MetricsParams {
    pub fn daily_risk_free_rate(&self) -> f64 {
        self.risk_free_rate / self.trading_days_per_year
    }

    pub fn annualization_factor(&self) -> f64 {
        self.trading_days_per_year.sqrt()
    }
}
