use analytics::{Dashboard, MetricsEngine};
use axum::{Router, routing::get};
use chrono::{NaiveDate, Utc};
use core_types::RangeOption;
use database::SeriesLoader;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

pub use error::{AppError, NO_DATA_MESSAGE};

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub loader: Arc<dyn SeriesLoader>,
    pub engine: MetricsEngine,
    /// The index every ticker is benchmarked against.
    pub benchmark: String,
}

impl AppState {
    pub fn new(
        loader: Arc<dyn SeriesLoader>,
        engine: MetricsEngine,
        benchmark: impl Into<String>,
    ) -> Self {
        Self {
            loader,
            engine,
            benchmark: benchmark.into(),
        }
    }

    /// One dashboard request: resolve the window ending `as_of` (default today),
    /// fetch the ticker and the benchmark concurrently, then run the engine.
    pub async fn dashboard(
        &self,
        ticker: &str,
        range: RangeOption,
        as_of: Option<NaiveDate>,
    ) -> Result<Dashboard, AppError> {
        let window = range.window_ending(as_of.unwrap_or_else(|| Utc::now().date_naive()));
        tracing::info!(
            ticker,
            benchmark = %self.benchmark,
            %range,
            start = %window.start,
            end = %window.end,
            "building dashboard"
        );

        let (subject, benchmark) = tokio::try_join!(
            self.loader.get_series(ticker, Some(window.start), Some(window.end)),
            self.loader.get_series(&self.benchmark, Some(window.start), Some(window.end)),
        )?;

        Ok(self.engine.analyze(&subject, &benchmark, range)?)
    }
}

/// Builds the API router over the given state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/tickers", get(handlers::get_tickers))
        .route("/api/ranges", get(handlers::get_ranges))
        .route("/api/dashboard/:ticker", get(handlers::get_dashboard))
        .with_state(Arc::new(state))
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// Runs the JSON API until the process is stopped.
pub async fn run_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = router(state);

    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
