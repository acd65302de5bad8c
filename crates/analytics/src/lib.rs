//! # MarketLens Metrics Engine
//!
//! This crate turns an ordered daily price history into the handful of KPIs and
//! chart-ready series the dashboard shows for a security and its benchmark.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No I/O and no shared state. It depends only on `core-types`.
//! - **Stateless Calculation:** `MetricsEngine` holds nothing but its numeric
//!   conventions (`MetricsParams`). Every call recomputes from its inputs.
//! - **Typed Undefined Values:** Statistics that cannot be computed (zero variance,
//!   too few observations) are `None`, never a silently propagating NaN.
//!
//! ## Public API
//!
//! - `MetricsEngine`: `compute_kpis`, `compute_derived_series`, `analyze`.
//! - `align`: forward-fills a benchmark onto a subject's date index.
//! - `KpiBundle`, `DerivedSeries`, `Dashboard`: the outputs.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

pub mod align;
pub mod engine;
pub mod error;
pub mod params;
pub mod report;
mod stats;

pub use align::{AlignedPair, align};
pub use engine::MetricsEngine;
pub use error::AnalyticsError;
pub use params::MetricsParams;
pub use report::{Dashboard, DerivedSeries, KpiBundle, SeriesPoint};
