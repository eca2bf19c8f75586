//! Request guards requiring an active Shopify session.
//!
//! Session-token validation happens inside Shopify's own libraries; these
//! guards only check that session storage holds an active session for the
//! shop named in the `shop` query parameter.

use std::marker::PhantomData;

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shopify_app_core::{AccessMode, ShopDomain};

use super::ShopifyAuthException;
use crate::db::{Session, SessionRepository};
use crate::error::AppError;
use crate::services::SessionStorage;
use crate::state::AppState;

/// Type-level access mode for [`ShopifyAuth`].
pub trait AuthMode: Send + Sync + 'static {
    /// The runtime access mode.
    const MODE: AccessMode;
}

/// User-scoped session required.
#[derive(Debug)]
pub enum Online {}

/// Shop-scoped session required.
#[derive(Debug)]
pub enum Offline {}

impl AuthMode for Online {
    const MODE: AccessMode = AccessMode::Online;
}

impl AuthMode for Offline {
    const MODE: AccessMode = AccessMode::Offline;
}

/// Extractor that requires an active session of mode `M`.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(auth: ShopifyAuth<Offline>) -> impl IntoResponse {
///     format!("Hello, {}!", auth.session.shop)
/// }
/// ```
#[derive(Debug)]
pub struct ShopifyAuth<M> {
    /// The active session.
    pub session: Session,
    _mode: PhantomData<M>,
}

/// Why a guarded request was rejected.
#[derive(Debug)]
pub enum AuthRejection {
    /// No active session; the caller has to authenticate.
    Unauthenticated(ShopifyAuthException),
    /// Session storage could not be read.
    Storage(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated(exception) => exception.into_response(),
            Self::Storage(err) => err.into_response(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ShopQuery {
    shop: Option<String>,
}

impl<M: AuthMode> FromRequestParts<AppState> for ShopifyAuth<M> {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let shop = Query::<ShopQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.shop)
            .unwrap_or_default();

        let session = authorize(&state.sessions(), &shop, M::MODE, Utc::now()).await?;

        Ok(Self {
            session,
            _mode: PhantomData,
        })
    }
}

/// Resolve the active session for `shop` in `mode`.
///
/// # Errors
///
/// Returns `AuthRejection::Unauthenticated` when the shop is missing or
/// malformed or has no active session, and `AuthRejection::Storage` when the
/// lookup itself fails.
pub async fn authorize<T: SessionRepository>(
    storage: &SessionStorage<T>,
    shop: &str,
    mode: AccessMode,
    now: DateTime<Utc>,
) -> Result<Session, AuthRejection> {
    let Ok(domain) = ShopDomain::parse(shop) else {
        return Err(AuthRejection::Unauthenticated(
            ShopifyAuthException::new(shop, mode).with_message("Missing or invalid shop"),
        ));
    };

    storage
        .load_active(&domain, mode, now)
        .await
        .map_err(|e| AuthRejection::Storage(e.into()))?
        .ok_or_else(|| {
            AuthRejection::Unauthenticated(
                ShopifyAuthException::new(domain.as_str(), mode)
                    .with_message("No active session for shop"),
            )
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::db::memory::MemorySessionRepository;
    use crate::services::offline_session_id;

    fn offline_session(shop: &ShopDomain) -> Session {
        Session {
            id: offline_session_id(shop),
            shop: shop.clone(),
            state: "state".to_string(),
            is_online: false,
            scope: None,
            expires: None,
            access_token: Some(SecretString::from("offline-token")),
            online_access_info: None,
        }
    }

    #[tokio::test]
    async fn test_authorize_invalid_shop() {
        let storage = SessionStorage::new(MemorySessionRepository::default());

        let err = authorize(&storage, "", AccessMode::Offline, Utc::now())
            .await
            .unwrap_err();

        let AuthRejection::Unauthenticated(exception) = err else {
            panic!("expected unauthenticated rejection");
        };
        assert_eq!(exception.access_mode, AccessMode::Offline);
        assert_eq!(exception.message, "Missing or invalid shop");
    }

    #[tokio::test]
    async fn test_authorize_without_session() {
        let storage = SessionStorage::new(MemorySessionRepository::default());

        let err = authorize(&storage, "Store.myshopify.com", AccessMode::Online, Utc::now())
            .await
            .unwrap_err();

        let AuthRejection::Unauthenticated(exception) = err else {
            panic!("expected unauthenticated rejection");
        };
        assert_eq!(exception.shop, "store.myshopify.com");
        assert_eq!(exception.access_mode, AccessMode::Online);
    }

    #[tokio::test]
    async fn test_authorize_with_session() {
        let storage = SessionStorage::new(MemorySessionRepository::default());
        let shop = ShopDomain::parse("store.myshopify.com").unwrap();
        storage.store_session(&offline_session(&shop)).await.unwrap();

        let session = authorize(&storage, "store.myshopify.com", AccessMode::Offline, Utc::now())
            .await
            .unwrap();
        assert_eq!(session.shop, shop);
    }

    #[tokio::test]
    async fn test_offline_session_does_not_satisfy_online() {
        let storage = SessionStorage::new(MemorySessionRepository::default());
        let shop = ShopDomain::parse("store.myshopify.com").unwrap();
        storage.store_session(&offline_session(&shop)).await.unwrap();

        assert!(
            authorize(&storage, "store.myshopify.com", AccessMode::Online, Utc::now())
                .await
                .is_err()
        );
    }
}
