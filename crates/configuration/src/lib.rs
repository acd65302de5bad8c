use crate::error::ConfigError;
use config::builder::DefaultState;
use config::ConfigBuilder;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Benchmark, Config, Logging, Server, Warehouse};

/// Loads the application configuration from the `config.toml` file.
///
/// The file is optional. Environment variables prefixed with `MARKETLENS` and
/// separated by double underscores (e.g. `MARKETLENS__SERVER__PORT=8080`)
/// override file values.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Same as [`load_config`] but reads the given file (if it exists).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("MARKETLENS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    build(builder)
}

fn build(builder: ConfigBuilder<DefaultState>) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.build()?.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(
        benchmark = %config.benchmark.ticker,
        table = %config.warehouse.table,
        "configuration loaded"
    );
    Ok(config)
}
