//! Shop routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use shopify_app_core::{AccessMode, ShopDomain, ShopId};
use tracing::instrument;

use crate::auth::{
    Offline, Online, RequireRegistrationToken, ShopifyAuth, ShopifyAuthException,
};
use crate::error::AppError;
use crate::state::AppState;

/// Build the shops router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/shops", post(register))
        .route("/api/shops/{domain}/exists", get(exists))
        .route("/api/shop", get(current_shop))
        .route("/api/session", get(current_session))
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Body of `POST /api/shops`.
#[derive(Deserialize)]
pub struct RegisterShopRequest {
    pub domain: ShopDomain,
    pub access_token: String,
}

/// A shop as returned to clients (never includes the token).
#[derive(Debug, Serialize)]
pub struct ShopView {
    pub id: ShopId,
    pub domain: ShopDomain,
}

#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub shop: ShopDomain,
    pub access_mode: AccessMode,
    pub scope: Option<String>,
    pub expires: Option<DateTime<Utc>>,
}

// =============================================================================
// Route Handlers
// =============================================================================

/// POST /api/shops - Register a shop or refresh its token.
///
/// Requires `Authorization: Bearer <APP_REGISTRATION_TOKEN>`.
#[instrument(skip(state, _auth, body), fields(shop = %body.domain))]
async fn register(
    State(state): State<AppState>,
    _auth: RequireRegistrationToken,
    Json(body): Json<RegisterShopRequest>,
) -> Result<Json<ShopView>, AppError> {
    if body.access_token.trim().is_empty() {
        return Err(AppError::BadRequest("access_token cannot be empty".to_string()));
    }

    let shop = state
        .shops()
        .find_or_create(&body.domain, SecretString::from(body.access_token))
        .await?;

    Ok(Json(ShopView {
        id: shop.id,
        domain: shop.domain,
    }))
}

/// GET /api/shops/{domain}/exists
#[instrument(skip(state))]
async fn exists(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<ExistsResponse>, AppError> {
    let domain = ShopDomain::parse(&domain).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let exists = state.shops().exists(&domain).await?;
    Ok(Json(ExistsResponse { exists }))
}

/// GET /api/shop - The shop behind the offline session.
///
/// A session without a registered shop means the app was uninstalled, so the
/// offline auth flow has to run again.
#[instrument(skip(state, auth), fields(shop = %auth.session.shop))]
async fn current_shop(
    State(state): State<AppState>,
    auth: ShopifyAuth<Offline>,
) -> Result<Json<ShopView>, AppError> {
    let shop = state
        .shops()
        .find(&auth.session.shop)
        .await?
        .ok_or_else(|| {
            ShopifyAuthException::new(auth.session.shop.as_str(), AccessMode::Offline)
                .with_message("Shop is not installed")
        })?;

    Ok(Json(ShopView {
        id: shop.id,
        domain: shop.domain,
    }))
}

/// GET /api/session - The active online session.
#[instrument(skip(auth), fields(shop = %auth.session.shop))]
async fn current_session(auth: ShopifyAuth<Online>) -> Json<SessionView> {
    let session = auth.session;
    Json(SessionView {
        access_mode: session.access_mode(),
        shop: session.shop,
        scope: session.scope,
        expires: session.expires,
    })
}
