//! The Shopify auth exception.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shopify_app_core::AccessMode;
use thiserror::Error;

/// Authentication failed for a shop; the caller must go through auth again.
///
/// Converting it into a response yields a bare status/message pair with the
/// exception parked in the response extensions. The
/// [`auth_exception_filter`](super::auth_exception_filter) middleware picks it
/// up from there and renders the final redirect or JSON body.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ShopifyAuthException {
    /// Shop the request was made for. May be empty when the request named none.
    pub shop: String,
    /// Which auth flow has to be restarted.
    pub access_mode: AccessMode,
    /// Human readable reason.
    pub message: String,
    /// HTTP status reported to online callers.
    pub status: StatusCode,
}

impl ShopifyAuthException {
    /// Create an exception with the default `401 Unauthorized` status.
    #[must_use]
    pub fn new(shop: impl Into<String>, access_mode: AccessMode) -> Self {
        Self {
            shop: shop.into(),
            access_mode,
            message: "Unauthorized".to_string(),
            status: StatusCode::UNAUTHORIZED,
        }
    }

    /// Replace the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Replace the status.
    #[must_use]
    pub const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl IntoResponse for ShopifyAuthException {
    fn into_response(self) -> Response {
        tracing::info!(
            shop = %self.shop,
            access_mode = %self.access_mode,
            reason = %self.message,
            "Shopify authentication required"
        );

        let mut response = (self.status, self.message.clone()).into_response();
        response.extensions_mut().insert(self);
        response
    }
}
