use crate::error::ConfigError;
use analytics::MetricsParams;
use serde::Deserialize;

/// The root configuration structure for the entire application.
///
/// Every section is optional; a missing `config.toml` yields the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub benchmark: Benchmark,
    pub analytics: MetricsParams,
    pub server: Server,
    pub warehouse: Warehouse,
    pub logging: Logging,
}

/// The market index every ticker is compared against.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Benchmark {
    pub ticker: String,
}

impl Default for Benchmark {
    fn default() -> Self {
        Self {
            ticker: "^GSPC".to_string(),
        }
    }
}

/// Where the JSON API listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Server {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Location of the daily price mart in the warehouse.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Warehouse {
    /// Table (optionally `schema.table`) holding `date, ticker, price, daily_return`.
    pub table: String,
}

impl Default for Warehouse {
    fn default() -> Self {
        Self {
            table: "mart_prices".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Logging {
    /// When set, a daily-rotated log file is written here in addition to stderr.
    pub directory: Option<String>,
}

impl Config {
    /// Rejects settings the engine or the warehouse adapter cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.analytics;
        if !(a.trading_days_per_year > 0.0) {
            return Err(ConfigError::invalid(
                "analytics.trading_days_per_year",
                "must be positive",
            ));
        }
        if !(a.calendar_days_per_year > 0.0) {
            return Err(ConfigError::invalid(
                "analytics.calendar_days_per_year",
                "must be positive",
            ));
        }
        if !(a.min_years > 0.0) {
            return Err(ConfigError::invalid("analytics.min_years", "must be positive"));
        }
        if a.rolling_min_periods < 2 {
            return Err(ConfigError::invalid(
                "analytics.rolling_min_periods",
                "must be at least 2",
            ));
        }
        if a.rolling_window < a.rolling_min_periods {
            return Err(ConfigError::invalid(
                "analytics.rolling_window",
                format!(
                    "{} is smaller than rolling_min_periods ({})",
                    a.rolling_window, a.rolling_min_periods
                ),
            ));
        }
        if self.benchmark.ticker.trim().is_empty() {
            return Err(ConfigError::invalid("benchmark.ticker", "must not be empty"));
        }
        if !is_table_name(&self.warehouse.table) {
            return Err(ConfigError::invalid(
                "warehouse.table",
                format!("'{}' is not a plain [schema.]table identifier", self.warehouse.table),
            ));
        }
        Ok(())
    }
}

/// The table name is spliced into SQL, so only `ident` or `ident.ident` is accepted.
fn is_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() <= 2
        && parts.iter().all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
