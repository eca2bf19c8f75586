//! Shop registration service.
//!
//! Called after a successful install or reinstall with the offline token
//! Shopify handed back. Keeps exactly one row per shop domain and drops any
//! online sessions minted under the previous token.

use secrecy::SecretString;
use shopify_app_core::ShopDomain;
use tracing::instrument;

use crate::db::{RepositoryError, Shop, ShopRepository};

/// Service for registering shops and refreshing their access tokens.
pub struct ShopsService<S> {
    shops: S,
}

impl<S: ShopRepository> ShopsService<S> {
    /// Create a new shops service.
    #[must_use]
    pub const fn new(shops: S) -> Self {
        Self { shops }
    }

    /// Register a shop, or refresh the access token of an already registered one.
    ///
    /// An existing shop keeps its id; only the token changes. Either way, all
    /// online sessions for the shop are deleted in the same write.
    ///
    /// # Errors
    ///
    /// Returns any `RepositoryError` raised by the repository. Nothing is
    /// persisted in that case.
    #[instrument(skip(self, access_token), fields(shop = %domain))]
    pub async fn find_or_create(
        &self,
        domain: &ShopDomain,
        access_token: SecretString,
    ) -> Result<Shop, RepositoryError> {
        let shop = self.shops.install(domain, &access_token).await?;
        tracing::info!(shop_id = %shop.id, "Stored shop access token");
        Ok(shop)
    }

    /// Check whether a shop is registered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the lookup fails.
    #[instrument(skip(self), fields(shop = %domain))]
    pub async fn exists(&self, domain: &ShopDomain) -> Result<bool, RepositoryError> {
        Ok(self.shops.find_by_domain(domain).await?.is_some())
    }

    /// Look up a registered shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the lookup fails.
    pub async fn find(&self, domain: &ShopDomain) -> Result<Option<Shop>, RepositoryError> {
        self.shops.find_by_domain(domain).await
    }
}
