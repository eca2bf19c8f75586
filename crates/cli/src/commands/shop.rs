//! Shop management commands.

use secrecy::SecretString;
use shopify_app_api::db::{PgSessionRepository, PgShopRepository};
use shopify_app_api::services::{SessionStorage, ShopsService};
use shopify_app_core::ShopDomain;
use tracing::info;

/// Register a shop, or refresh its token if already registered.
///
/// Online sessions for the shop are dropped either way.
///
/// # Errors
///
/// Returns an error if the domain is invalid or a database operation fails.
pub async fn register(domain: &str, token: String) -> Result<(), Box<dyn std::error::Error>> {
    let domain = ShopDomain::parse(domain)?;
    if token.trim().is_empty() {
        return Err("access token cannot be empty".into());
    }

    let pool = super::connect().await?;
    let shops = ShopsService::new(PgShopRepository::new(&pool));

    let shop = shops
        .find_or_create(&domain, SecretString::from(token))
        .await?;

    info!(shop_id = %shop.id, shop = %shop.domain, "Shop registered");
    Ok(())
}

/// Print whether a shop is registered.
///
/// # Errors
///
/// Returns an error if the domain is invalid or the lookup fails.
pub async fn exists(domain: &str) -> Result<(), Box<dyn std::error::Error>> {
    let domain = ShopDomain::parse(domain)?;
    let pool = super::connect().await?;
    let shops = ShopsService::new(PgShopRepository::new(&pool));

    let exists = shops.exists(&domain).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{exists}");
    }
    Ok(())
}

/// Print the sessions stored for a shop, one per line.
///
/// # Errors
///
/// Returns an error if the domain is invalid or the lookup fails.
pub async fn sessions(domain: &str) -> Result<(), Box<dyn std::error::Error>> {
    let domain = ShopDomain::parse(domain)?;
    let pool = super::connect().await?;
    let storage = SessionStorage::new(PgSessionRepository::new(&pool));

    let sessions = storage.find_sessions_by_shop(&domain).await?;

    #[allow(clippy::print_stdout)]
    {
        for session in &sessions {
            let expires = session
                .expires
                .map_or_else(|| "never".to_string(), |e| e.to_rfc3339());
            println!("{}\t{}\texpires={expires}", session.id, session.access_mode());
        }
    }
    info!(count = sessions.len(), "Sessions listed");
    Ok(())
}
