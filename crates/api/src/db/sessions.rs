//! Session repository.
//!
//! Sessions are written by the auth flow and read by the request guards.
//! Offline sessions live under the id `offline_{shop}`; online sessions carry
//! an expiry and the associated staff member in `online_access_info`.

use std::future::Future;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use shopify_app_core::{AccessMode, ShopDomain};
use sqlx::PgPool;
use sqlx::types::Json;

use super::RepositoryError;

// =============================================================================
// Types
// =============================================================================

/// A Shopify auth session.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct Session {
    /// Session id.
    pub id: String,
    /// Shop the session belongs to.
    pub shop: ShopDomain,
    /// OAuth state nonce the session was created with.
    pub state: String,
    /// `true` for user-scoped sessions.
    pub is_online: bool,
    /// Granted scopes, comma separated.
    pub scope: Option<String>,
    /// Expiry (online sessions only).
    pub expires: Option<DateTime<Utc>>,
    /// Access token (redacted in debug output).
    pub access_token: Option<SecretString>,
    /// Staff member details for online sessions.
    pub online_access_info: Option<serde_json::Value>,
}

impl Session {
    /// The access mode this session grants.
    #[must_use]
    pub const fn access_mode(&self) -> AccessMode {
        if self.is_online {
            AccessMode::Online
        } else {
            AccessMode::Offline
        }
    }

    /// A session is active when it holds a token that has not expired.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.access_token.is_some() && self.expires.is_none_or(|expires| expires > now)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("shop", &self.shop)
            .field("state", &self.state)
            .field("is_online", &self.is_online)
            .field("scope", &self.scope)
            .field("expires", &self.expires)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("online_access_info", &self.online_access_info)
            .finish()
    }
}

/// Internal row type for `PostgreSQL` queries.
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: String,
    shop: String,
    state: String,
    is_online: bool,
    scope: Option<String>,
    expires: Option<DateTime<Utc>>,
    access_token: Option<String>,
    online_access_info: Option<Json<serde_json::Value>>,
}

impl TryFrom<SessionRow> for Session {
    type Error = RepositoryError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let shop = ShopDomain::parse(&row.shop).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid shop in session {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            shop,
            state: row.state,
            is_online: row.is_online,
            scope: row.scope,
            expires: row.expires,
            access_token: row.access_token.map(SecretString::from),
            online_access_info: row.online_access_info.map(|Json(value)| value),
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Storage operations on the `sessions` table.
pub trait SessionRepository: Send + Sync {
    /// Insert or replace a session by id.
    fn store(&self, session: &Session) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Load a session by id.
    fn load(&self, id: &str)
    -> impl Future<Output = Result<Option<Session>, RepositoryError>> + Send;

    /// Delete a session by id. Returns whether a row was removed.
    fn delete(&self, id: &str) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Delete several sessions by id. Returns the number of rows removed.
    fn delete_many(&self, ids: &[String])
    -> impl Future<Output = Result<u64, RepositoryError>> + Send;

    /// All sessions belonging to a shop.
    fn find_by_shop(
        &self,
        shop: &ShopDomain,
    ) -> impl Future<Output = Result<Vec<Session>, RepositoryError>> + Send;

    /// Delete every session of a shop with the given online flag.
    /// Returns the number of rows removed.
    fn delete_by_shop(
        &self,
        shop: &ShopDomain,
        is_online: bool,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;
}

/// `PostgreSQL` implementation of [`SessionRepository`].
pub struct PgSessionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PgSessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl SessionRepository for PgSessionRepository<'_> {
    async fn store(&self, session: &Session) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO sessions
                (id, shop, state, is_online, scope, expires, access_token, online_access_info)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT(id) DO UPDATE SET
                shop = EXCLUDED.shop,
                state = EXCLUDED.state,
                is_online = EXCLUDED.is_online,
                scope = EXCLUDED.scope,
                expires = EXCLUDED.expires,
                access_token = EXCLUDED.access_token,
                online_access_info = EXCLUDED.online_access_info
            ",
        )
        .bind(&session.id)
        .bind(&session.shop)
        .bind(&session.state)
        .bind(session.is_online)
        .bind(session.scope.as_deref())
        .bind(session.expires)
        .bind(session.access_token.as_ref().map(|token| token.expose_secret()))
        .bind(session.online_access_info.as_ref().map(Json))
        .execute(self.pool)
        .await?;

        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<Session>, RepositoryError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r"
            SELECT id, shop, state, is_online, scope, expires, access_token, online_access_info
            FROM sessions
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Session::try_from).transpose()
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, ids: &[String]) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ANY($1)")
            .bind(ids)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn find_by_shop(&self, shop: &ShopDomain) -> Result<Vec<Session>, RepositoryError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r"
            SELECT id, shop, state, is_online, scope, expires, access_token, online_access_info
            FROM sessions
            WHERE shop = $1
            ORDER BY expires DESC NULLS LAST
            ",
        )
        .bind(shop)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Session::try_from).collect()
    }

    async fn delete_by_shop(
        &self,
        shop: &ShopDomain,
        is_online: bool,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE shop = $1 AND is_online = $2")
            .bind(shop)
            .bind(is_online)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
