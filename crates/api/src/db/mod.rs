//! Database operations for the app `PostgreSQL`.
//!
//! ## Tables
//!
//! - `shops` - Installed shops and their offline access tokens
//! - `sessions` - Shopify auth sessions (online and offline)
//!
//! Each table sits behind a repository trait so services can run against
//! `PostgreSQL` in production and an in-memory store in unit tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/`, embedded as [`MIGRATOR`],
//! and run via:
//! ```bash
//! cargo run -p shopify-app-cli -- migrate
//! ```

pub mod sessions;
pub mod shops;

#[cfg(test)]
pub(crate) mod memory;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use sessions::{PgSessionRepository, Session, SessionRepository};
pub use shops::{PgShopRepository, Shop, ShopRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Embedded migrations from `crates/api/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
