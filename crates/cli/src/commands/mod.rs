//! CLI command implementations.

pub mod migrate;
pub mod shop;

use shopify_app_api::{config, db};
use sqlx::PgPool;

/// Connect to the app database named by the environment.
async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let database_url = config::database_url_from_env()?;
    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
