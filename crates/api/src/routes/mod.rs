//! HTTP route handlers.
//!
//! - `/api/shops` - Shop registration and lookup
//! - `/api/shop`, `/api/session` - Guarded by an active Shopify session

pub mod shops;

use axum::Router;

use crate::state::AppState;

/// Build the API router.
pub fn routes() -> Router<AppState> {
    Router::new().merge(shops::router())
}
