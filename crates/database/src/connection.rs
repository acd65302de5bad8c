use crate::error::DbError;
use dotenvy::dotenv;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL warehouse.
///
/// Reads `DATABASE_URL` from the environment (a `.env` file is honoured when
/// present). The credentials live entirely in that URL.
pub async fn connect() -> Result<PgPool, DbError> {
    // A missing .env file is fine; the variable may already be exported.
    dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .map_err(|_e| DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await?;

    tracing::info!("connected to price warehouse");
    Ok(pool)
}

/// Applies the embedded migrations so a fresh database has the price mart table.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
