//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! shopify-app-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `APP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/api/migrations/` and are embedded at build time:
//! ```text
//! migrations/
//! ├── 20260301000001_create_shops.sql
//! └── 20260301000002_create_sessions.sql
//! ```

use shopify_app_api::db::MIGRATOR;

/// Run the app database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
