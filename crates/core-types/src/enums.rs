use crate::error::CoreError;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The look-back windows a user can select on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeOption {
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "3Y")]
    ThreeYears,
    #[serde(rename = "5Y")]
    FiveYears,
}

impl RangeOption {
    /// Every supported range, shortest first.
    pub const ALL: [RangeOption; 5] = [
        RangeOption::OneMonth,
        RangeOption::SixMonths,
        RangeOption::OneYear,
        RangeOption::ThreeYears,
        RangeOption::FiveYears,
    ];

    /// The short label shown in selectors and accepted on the command line.
    pub fn label(&self) -> &'static str {
        match self {
            RangeOption::OneMonth => "1M",
            RangeOption::SixMonths => "6M",
            RangeOption::OneYear => "1Y",
            RangeOption::ThreeYears => "3Y",
            RangeOption::FiveYears => "5Y",
        }
    }

    /// Calendar days subtracted from "today" to find the window start.
    pub fn lookback_days(&self) -> i64 {
        match self {
            RangeOption::OneMonth => 30,
            RangeOption::SixMonths => 180,
            RangeOption::OneYear => 365,
            RangeOption::ThreeYears => 365 * 3,
            RangeOption::FiveYears => 365 * 5,
        }
    }

    /// The headline return convention. The shortest window reports a raw
    /// period return; every longer one an annualized rate.
    pub fn return_label(&self) -> ReturnLabel {
        match self {
            RangeOption::OneMonth => ReturnLabel::PeriodReturn,
            RangeOption::SixMonths
            | RangeOption::OneYear
            | RangeOption::ThreeYears
            | RangeOption::FiveYears => ReturnLabel::Cagr,
        }
    }

    /// Resolves the inclusive date window that ends on `today`.
    pub fn window_ending(&self, today: NaiveDate) -> DateWindow {
        DateWindow {
            start: today - Duration::days(self.lookback_days()),
            end: today,
        }
    }
}

impl fmt::Display for RangeOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RangeOption {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RangeOption::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownRange(s.to_string()))
    }
}

/// An inclusive `[start, end]` calendar window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Which return convention the headline return KPI uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnLabel {
    #[serde(rename = "Period Return")]
    PeriodReturn,
    #[serde(rename = "CAGR")]
    Cagr,
}

impl ReturnLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnLabel::PeriodReturn => "Period Return",
            ReturnLabel::Cagr => "CAGR",
        }
    }
}

impl fmt::Display for ReturnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
