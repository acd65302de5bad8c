//! # MarketLens Series Loader
//!
//! This crate is the dashboard's only way to obtain price histories.
//!
//! ## Architectural Principles
//!
//! - **Adapter Behind a Trait:** Callers depend on `SeriesLoader`, never on SQL.
//!   `PriceRepository` talks to the PostgreSQL warehouse; `InMemoryLoader`
//!   serves fixture data for offline runs and tests.
//! - **Asynchronous & Pooled:** The warehouse adapter uses a `PgPool`, so the
//!   subject and benchmark histories can be fetched concurrently.
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: pool setup and schema bootstrap.
//! - `SeriesLoader`: `list_tickers` and `get_series`.
//! - `PriceRepository`, `InMemoryLoader`: the two implementations.
//! - `DbError`: the specific error types that can be returned from this crate.

pub mod connection;
pub mod error;
pub mod loader;
pub mod repository;

pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use loader::{InMemoryLoader, SeriesLoader};
pub use repository::PriceRepository;
