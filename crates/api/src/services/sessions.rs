//! Shopify session storage.
//!
//! The session storage contract the auth flow writes through and the request
//! guards read through.

use chrono::{DateTime, Utc};
use shopify_app_core::{AccessMode, ShopDomain};
use tracing::instrument;

use crate::db::{RepositoryError, Session, SessionRepository};

/// Id of the offline session for a shop.
#[must_use]
pub fn offline_session_id(shop: &ShopDomain) -> String {
    format!("offline_{shop}")
}

/// Session storage backed by a [`SessionRepository`].
pub struct SessionStorage<T> {
    repo: T,
}

impl<T: SessionRepository> SessionStorage<T> {
    /// Create a new session storage.
    #[must_use]
    pub const fn new(repo: T) -> Self {
        Self { repo }
    }

    /// Store (insert or replace) a session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    #[instrument(skip(self, session), fields(session_id = %session.id, shop = %session.shop))]
    pub async fn store_session(&self, session: &Session) -> Result<(), RepositoryError> {
        self.repo.store(session).await
    }

    /// Load a session by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the read fails.
    pub async fn load_session(&self, id: &str) -> Result<Option<Session>, RepositoryError> {
        self.repo.load(id).await
    }

    /// Delete a session by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete_session(&self, id: &str) -> Result<bool, RepositoryError> {
        self.repo.delete(id).await
    }

    /// Delete several sessions by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete_sessions(&self, ids: &[String]) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.repo.delete_many(ids).await
    }

    /// Delete every session of a shop in `mode`, e.g. on uninstall.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self), fields(shop = %shop))]
    pub async fn delete_sessions_by_shop(
        &self,
        shop: &ShopDomain,
        mode: AccessMode,
    ) -> Result<u64, RepositoryError> {
        self.repo.delete_by_shop(shop, mode.is_online()).await
    }

    /// All sessions of a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the read fails.
    pub async fn find_sessions_by_shop(
        &self,
        shop: &ShopDomain,
    ) -> Result<Vec<Session>, RepositoryError> {
        self.repo.find_by_shop(shop).await
    }

    /// The session a request in `mode` for `shop` should run under, if any.
    ///
    /// Offline requests use the shop's offline session. Online requests use
    /// the active online session expiring last.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the read fails.
    pub async fn load_active(
        &self,
        shop: &ShopDomain,
        mode: AccessMode,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, RepositoryError> {
        let session = match mode {
            AccessMode::Offline => self
                .repo
                .load(&offline_session_id(shop))
                .await?
                .filter(|s| !s.is_online && s.is_active(now)),
            AccessMode::Online => self
                .repo
                .find_by_shop(shop)
                .await?
                .into_iter()
                .filter(|s| s.is_online && s.is_active(now))
                .max_by_key(|s| s.expires),
        };

        Ok(session)
    }
}
