//! Fetch wrapper that sends the user back through auth when the server asks.

use reqwest::Response;
use shopify_app_core::reauthorize::{
    DEFAULT_AUTH_PATH, REAUTHORIZE_HEADER, REAUTHORIZE_URL_HEADER, is_reauthorize_signal,
};
use url::Url;

use crate::error::ClientError;
use crate::fetch::{AuthenticatedFetch, FetchOptions};
use crate::redirect::Redirect;

/// Wraps an [`AuthenticatedFetch`] and follows reauthorize signals.
pub struct UserLoggedInFetch<F, R> {
    fetch: F,
    redirect: R,
    base_url: Url,
}

impl<F: AuthenticatedFetch, R: Redirect> UserLoggedInFetch<F, R> {
    /// `base_url` resolves relative URIs passed to [`Self::fetch`].
    pub const fn new(fetch: F, redirect: R, base_url: Url) -> Self {
        Self {
            fetch,
            redirect,
            base_url,
        }
    }

    /// Issue the request.
    ///
    /// Returns `Ok(None)` after dispatching a remote redirect when the
    /// response carries the reauthorize signal. Any other response is
    /// returned untouched, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if `uri` cannot be resolved, or the
    /// error of the underlying fetch.
    pub async fn fetch(
        &self,
        uri: &str,
        options: FetchOptions,
    ) -> Result<Option<Response>, ClientError> {
        let url = self.base_url.join(uri)?;
        let response = self.fetch.fetch(url, options).await?;

        let headers = response.headers();
        let signal = headers
            .get(REAUTHORIZE_HEADER)
            .and_then(|v| v.to_str().ok());
        if !is_reauthorize_signal(signal) {
            return Ok(Some(response));
        }

        let auth_url = headers
            .get(REAUTHORIZE_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_AUTH_PATH);

        tracing::info!(auth_url, "Reauthorization requested, redirecting");
        self.redirect.dispatch_remote(auth_url);
        Ok(None)
    }
}
