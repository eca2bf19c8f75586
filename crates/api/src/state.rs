//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::AuthFilter;
use crate::config::AppConfig;
use crate::db::{PgSessionRepository, PgShopRepository};
use crate::services::{SessionStorage, ShopsService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    auth_filter: AuthFilter,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let auth_filter = AuthFilter::new(&config.shopify, &config.global_prefix, config.auth.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                auth_filter,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the auth exception filter.
    #[must_use]
    pub fn auth_filter(&self) -> &AuthFilter {
        &self.inner.auth_filter
    }

    /// Shops service over the `PostgreSQL` repositories.
    #[must_use]
    pub fn shops(&self) -> ShopsService<PgShopRepository<'_>> {
        ShopsService::new(PgShopRepository::new(self.pool()))
    }

    /// Session storage over the `PostgreSQL` repository.
    #[must_use]
    pub fn sessions(&self) -> SessionStorage<PgSessionRepository<'_>> {
        SessionStorage::new(PgSessionRepository::new(self.pool()))
    }
}
