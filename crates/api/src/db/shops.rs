//! Shop repository.
//!
//! A shop is the tenant record: one row per storefront domain holding the
//! offline access token obtained at install time.

use std::future::Future;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use shopify_app_core::{ShopDomain, ShopId};
use sqlx::PgPool;

use super::RepositoryError;

// =============================================================================
// Types
// =============================================================================

/// An installed shop.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct Shop {
    /// Database identity.
    pub id: ShopId,
    /// Storefront domain (unique).
    pub domain: ShopDomain,
    /// Offline access token (redacted in debug output).
    pub access_token: SecretString,
    /// When the shop was first registered.
    pub created_at: DateTime<Utc>,
    /// When the shop was last updated.
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Shop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shop")
            .field("id", &self.id)
            .field("domain", &self.domain)
            .field("access_token", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Internal row type for `PostgreSQL` queries.
#[derive(Debug, sqlx::FromRow)]
struct ShopRow {
    id: ShopId,
    domain: String,
    access_token: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ShopRow> for Shop {
    type Error = RepositoryError;

    fn try_from(row: ShopRow) -> Result<Self, Self::Error> {
        let domain = ShopDomain::parse(&row.domain).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid domain for shop {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            domain,
            access_token: SecretString::from(row.access_token),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Storage operations on the `shops` table.
pub trait ShopRepository: Send + Sync {
    /// Find the shop registered for a domain.
    fn find_by_domain(
        &self,
        domain: &ShopDomain,
    ) -> impl Future<Output = Result<Option<Shop>, RepositoryError>> + Send;

    /// Store `access_token` for `domain` and delete the shop's online sessions.
    ///
    /// Inserts the shop on first install; afterwards the row keeps its id and
    /// only the token changes. Both writes commit together or not at all, and
    /// concurrent installs of the same domain all succeed on the same row.
    fn install(
        &self,
        domain: &ShopDomain,
        access_token: &SecretString,
    ) -> impl Future<Output = Result<Shop, RepositoryError>> + Send;
}

/// `PostgreSQL` implementation of [`ShopRepository`].
pub struct PgShopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PgShopRepository<'a> {
    /// Create a new shop repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl ShopRepository for PgShopRepository<'_> {
    async fn find_by_domain(&self, domain: &ShopDomain) -> Result<Option<Shop>, RepositoryError> {
        let row = sqlx::query_as::<_, ShopRow>(
            r"
            SELECT id, domain, access_token, created_at, updated_at
            FROM shops
            WHERE domain = $1
            ",
        )
        .bind(domain)
        .fetch_optional(self.pool)
        .await?;

        row.map(Shop::try_from).transpose()
    }

    async fn install(
        &self,
        domain: &ShopDomain,
        access_token: &SecretString,
    ) -> Result<Shop, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ShopRow>(
            r"
            INSERT INTO shops (domain, access_token)
            VALUES ($1, $2)
            ON CONFLICT(domain) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                updated_at = NOW()
            RETURNING id, domain, access_token, created_at, updated_at
            ",
        )
        .bind(domain)
        .bind(access_token.expose_secret())
        .fetch_one(&mut *tx)
        .await?;
        let shop = Shop::try_from(row)?;

        let removed = sqlx::query("DELETE FROM sessions WHERE shop = $1 AND is_online")
            .bind(domain)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        tracing::debug!(shop_id = %shop.id, removed, "Invalidated online sessions");
        Ok(shop)
    }
}
