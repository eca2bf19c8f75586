//! Authenticated requests.

use std::future::Future;

use reqwest::{
    Body, Client, Method, Response,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use url::Url;

use crate::error::ClientError;

/// Request parameters, the counterpart of a browser `RequestInit`.
#[derive(Debug, Default)]
pub struct FetchOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Body>,
}

impl FetchOptions {
    /// A request with the given method and no body.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Sets a JSON body and the matching content type.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Json` if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, ClientError> {
        self.body = Some(Body::from(serde_json::to_vec(value)?));
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }
}

/// Sends requests carrying the app's credentials.
pub trait AuthenticatedFetch: Send + Sync {
    /// Issue the request and return the raw response.
    fn fetch(
        &self,
        url: Url,
        options: FetchOptions,
    ) -> impl Future<Output = Result<Response, ClientError>> + Send;
}

/// Source of the session token attached to each request.
///
/// Embedded apps mint a fresh token per request; a fixed token works for
/// scripts and tests.
pub trait SessionTokenProvider: Send + Sync {
    fn session_token(&self) -> impl Future<Output = Result<SecretString, ClientError>> + Send;
}

impl SessionTokenProvider for SecretString {
    async fn session_token(&self) -> Result<SecretString, ClientError> {
        Ok(self.clone())
    }
}

/// [`AuthenticatedFetch`] that sends `Authorization: Bearer <session token>`.
#[derive(Clone)]
pub struct BearerFetch<P> {
    client: Client,
    tokens: P,
}

impl<P: SessionTokenProvider> BearerFetch<P> {
    #[must_use]
    pub const fn new(client: Client, tokens: P) -> Self {
        Self { client, tokens }
    }
}

impl<P: SessionTokenProvider> AuthenticatedFetch for BearerFetch<P> {
    async fn fetch(&self, url: Url, options: FetchOptions) -> Result<Response, ClientError> {
        let token = self.tokens.session_token().await?;

        let mut request = self
            .client
            .request(options.method, url)
            .headers(options.headers)
            .bearer_auth(token.expose_secret());
        if let Some(body) = options.body {
            request = request.body(body);
        }

        Ok(request.send().await?)
    }
}
