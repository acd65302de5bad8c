use crate::{AppState, error::AppError};
use analytics::Dashboard;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use core_types::RangeOption;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// One of `1M`, `6M`, `1Y`, `3Y`, `5Y`. Defaults to `1M`.
    pub range: Option<String>,
    /// Last day of the window. Defaults to today.
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeInfo {
    pub label: &'static str,
    pub lookback_days: i64,
}

/// # GET /api/tickers
pub async fn get_tickers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, AppError> {
    let tickers = state.loader.list_tickers().await?;
    Ok(Json(tickers))
}

/// # GET /api/ranges
pub async fn get_ranges() -> Json<Vec<RangeInfo>> {
    Json(
        RangeOption::ALL
            .into_iter()
            .map(|r| RangeInfo {
                label: r.label(),
                lookback_days: r.lookback_days(),
            })
            .collect(),
    )
}

/// # GET /api/dashboard/:ticker?range=1Y&as_of=2024-06-28
/// KPIs and chart series for a ticker against the configured benchmark.
pub async fn get_dashboard(
    Path(ticker): Path<String>,
    Query(query): Query<DashboardQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Dashboard>, AppError> {
    let range = match query.range.as_deref() {
        Some(label) => label
            .parse::<RangeOption>()
            .map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => RangeOption::OneMonth,
    };

    let dashboard = state.dashboard(&ticker, range, query.as_of).await?;
    Ok(Json(dashboard))
}
