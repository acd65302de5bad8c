use analytics::MetricsEngine;
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use configuration::{Config, Logging, load_config, load_config_from};
use core_types::RangeOption;
use database::{InMemoryLoader, PriceRepository, SeriesLoader, connect, run_migrations};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use web_server::{AppState, NO_DATA_MESSAGE};

mod render;

/// The main entry point for the MarketLens dashboard.
#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file, if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = init_tracing(&config.logging);

    match run(cli, config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = ?e, "command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Performance metrics for a security against a market benchmark.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file to read instead of `config.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serve prices from a JSON fixture instead of the warehouse.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every ticker available in the warehouse.
    Tickers,
    /// Compute and print the dashboard for one ticker.
    Report(ReportArgs),
    /// Run the JSON API.
    Serve(ServeArgs),
    /// Load a JSON fixture of price rows into the warehouse table.
    Import(ImportArgs),
}

#[derive(Parser)]
struct ReportArgs {
    /// The symbol to analyze (e.g., "AAPL").
    #[arg(long)]
    ticker: String,

    /// Look-back window: 1M, 6M, 1Y, 3Y or 5Y.
    #[arg(long, default_value = "1M")]
    range: RangeOption,

    /// Benchmark ticker; defaults to the configured benchmark.
    #[arg(long)]
    benchmark: Option<String>,

    /// Last day of the window (format: YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Print the full dashboard as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct ServeArgs {
    /// Listen address; defaults to the configured host and port.
    #[arg(long)]
    addr: Option<SocketAddr>,
}

#[derive(Parser)]
struct ImportArgs {
    /// JSON array of `{date, ticker, price, daily_return}` rows.
    file: PathBuf,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn run(cli: Cli, config: Config) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Tickers => {
            let loader = build_loader(cli.data.as_deref(), &config).await?;
            for ticker in loader.list_tickers().await? {
                println!("{}", ticker);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Report(args) => {
            let loader = build_loader(cli.data.as_deref(), &config).await?;
            handle_report(args, loader, &config).await
        }
        Commands::Serve(args) => {
            let loader = build_loader(cli.data.as_deref(), &config).await?;
            let addr = match args.addr {
                Some(addr) => addr,
                None => {
                    let address = config.server.address();
                    address
                        .parse()
                        .with_context(|| format!("invalid server address '{}'", address))?
                }
            };
            let state = AppState::new(
                loader,
                MetricsEngine::with_params(config.analytics.clone()),
                config.benchmark.ticker.clone(),
            );
            web_server::run_server(addr, state).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Import(args) => {
            handle_import(&args.file, &config).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Computes one dashboard and prints it, or the no-data notice.
async fn handle_report(
    args: ReportArgs,
    loader: Arc<dyn SeriesLoader>,
    config: &Config,
) -> anyhow::Result<ExitCode> {
    let benchmark = args.benchmark.unwrap_or_else(|| config.benchmark.ticker.clone());
    let engine = MetricsEngine::with_params(config.analytics.clone());
    let state = AppState::new(loader, engine, benchmark);

    let dashboard = match state.dashboard(&args.ticker, args.range, args.as_of).await {
        Ok(dashboard) => dashboard,
        Err(e) if e.is_no_data() => {
            eprintln!("{}", NO_DATA_MESSAGE);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        render::print_dashboard(&dashboard);
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_import(file: &Path, config: &Config) -> anyhow::Result<()> {
    let fixture = InMemoryLoader::from_json_file(file)?;

    let pool = connect().await.context("failed to connect to the database")?;
    run_migrations(&pool).await.context("failed to run database migrations")?;
    let repo = PriceRepository::new(pool, config.warehouse.table.clone());

    for ticker in fixture.list_tickers().await? {
        let series = fixture.get_series(&ticker, None, None).await?;
        repo.save_series(&series).await?;
        tracing::info!(%ticker, rows = series.len(), "imported price rows");
    }
    Ok(())
}

/// Picks the fixture loader when `--data` is given, otherwise the warehouse.
async fn build_loader(
    data: Option<&Path>,
    config: &Config,
) -> anyhow::Result<Arc<dyn SeriesLoader>> {
    match data {
        Some(path) => Ok(Arc::new(InMemoryLoader::from_json_file(path)?)),
        None => {
            let pool = connect().await.context("failed to connect to the database")?;
            Ok(Arc::new(PriceRepository::new(pool, config.warehouse.table.clone())))
        }
    }
}

/// Installs the global subscriber: stderr always, plus a daily file when configured.
fn init_tracing(logging: &Logging) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "marketlens.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(filter).with(stderr_layer).init();
            None
        }
    }
}
