//! Middleware rendering [`ShopifyAuthException`] responses.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue, StatusCode,
        header::{HOST, LOCATION},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use shopify_app_core::{AccessMode, reauthorize::REAUTHORIZE_VALUE};
use thiserror::Error;
use url::Url;

use super::{AuthModuleOptions, ShopifyAuthException};
use crate::config::ShopifyConfig;

static REAUTHORIZE: HeaderName =
    HeaderName::from_static("x-shopify-api-request-failure-reauthorize");
static REAUTHORIZE_URL: HeaderName =
    HeaderName::from_static("x-shopify-api-request-failure-reauthorize-url");

/// Errors building the auth URL.
#[derive(Debug, Error)]
pub enum AuthUrlError {
    /// Neither the configured host name nor the request named a host.
    #[error("no host name configured and request has no Host header")]
    MissingHost,

    /// The scheme/host/path combination is not a valid URL.
    #[error("invalid auth URL: {0}")]
    Invalid(#[from] url::ParseError),
}

/// JSON body returned to online callers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthErrorBody<'a> {
    message: &'a str,
    status_code: u16,
    timestamp: String,
}

/// Renders auth exceptions into redirects or JSON errors.
///
/// Cheaply cloneable; used as the middleware state.
#[derive(Debug, Clone)]
pub struct AuthFilter {
    inner: Arc<AuthFilterInner>,
}

#[derive(Debug)]
struct AuthFilterInner {
    host_scheme: Option<String>,
    host_name: Option<String>,
    global_prefix: String,
    options: AuthModuleOptions,
}

impl AuthFilter {
    /// Create a filter from the Shopify host settings and auth options.
    #[must_use]
    pub fn new(shopify: &ShopifyConfig, global_prefix: &str, options: AuthModuleOptions) -> Self {
        Self {
            inner: Arc::new(AuthFilterInner {
                host_scheme: shopify.host_scheme.clone(),
                host_name: shopify.host_name.clone(),
                global_prefix: global_prefix.to_string(),
                options,
            }),
        }
    }

    /// Build the URL that restarts the auth flow for `exception`.
    ///
    /// The scheme defaults to `https`; the host falls back to the request's
    /// `Host` header when none is configured.
    ///
    /// # Errors
    ///
    /// Returns `AuthUrlError::MissingHost` if no host is known, or
    /// `AuthUrlError::Invalid` if the parts don't form a URL.
    pub fn auth_url(
        &self,
        exception: &ShopifyAuthException,
        request_host: Option<&str>,
    ) -> Result<Url, AuthUrlError> {
        let options = self.inner.options.for_mode(exception.access_mode);
        let scheme = self.inner.host_scheme.as_deref().unwrap_or("https");
        let host = self
            .inner
            .host_name
            .as_deref()
            .or(request_host)
            .ok_or(AuthUrlError::MissingHost)?;

        let prefix = if options.use_global_prefix {
            self.inner.global_prefix.as_str()
        } else {
            ""
        };
        let path = join_url(&[prefix, &options.base_path, "auth"]);

        let mut url = Url::parse(&format!("{scheme}://{host}"))?.join(&path)?;
        url.query_pairs_mut().append_pair("shop", &exception.shop);
        Ok(url)
    }

    /// Render the final response for an auth exception.
    #[must_use]
    pub fn render(&self, exception: &ShopifyAuthException, request_host: Option<&str>) -> Response {
        let auth_url = match self.auth_url(exception, request_host) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::error!(error = %e, shop = %exception.shop, "Failed to build Shopify auth URL");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
            }
        };

        let mut response = match exception.access_mode {
            AccessMode::Offline => (
                StatusCode::FOUND,
                [(LOCATION, auth_url.clone())],
                format!("Redirecting to {auth_url}"),
            )
                .into_response(),
            AccessMode::Online => (
                exception.status,
                Json(AuthErrorBody {
                    message: &exception.message,
                    status_code: exception.status.as_u16(),
                    timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                }),
            )
                .into_response(),
        };

        let options = self.inner.options.for_mode(exception.access_mode);
        if options.return_headers {
            if let Ok(value) = HeaderValue::from_str(&auth_url) {
                let headers = response.headers_mut();
                headers.insert(
                    REAUTHORIZE.clone(),
                    HeaderValue::from_static(REAUTHORIZE_VALUE),
                );
                headers.insert(REAUTHORIZE_URL.clone(), value);
            }
        }

        response
    }
}

/// Replace responses carrying a [`ShopifyAuthException`] with the rendered auth response.
///
/// All other responses pass through untouched.
pub async fn auth_exception_filter(
    State(filter): State<AuthFilter>,
    request: Request,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .map(String::from)
        .or_else(|| request.uri().authority().map(|a| a.as_str().to_string()));

    let response = next.run(request).await;

    match response.extensions().get::<ShopifyAuthException>() {
        Some(exception) => filter.render(exception, host.as_deref()),
        None => response,
    }
}

/// Join URL path segments into an absolute path.
///
/// Leading and trailing slashes of each segment are dropped and empty
/// segments are skipped, so `["/api/", "", "/offline", "auth"]` becomes
/// `/api/offline/auth`.
#[must_use]
pub fn join_url(segments: &[&str]) -> String {
    let joined = segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{joined}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::Request as HttpRequest,
        middleware::from_fn_with_state,
        routing::get,
    };
    use shopify_app_core::reauthorize::{REAUTHORIZE_HEADER, REAUTHORIZE_URL_HEADER};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::AuthOptions;

    fn options(return_headers: bool) -> AuthModuleOptions {
        AuthModuleOptions {
            online: AuthOptions {
                base_path: "/online".to_string(),
                use_global_prefix: true,
                return_headers,
            },
            offline: AuthOptions {
                base_path: "/offline".to_string(),
                use_global_prefix: false,
                return_headers,
            },
        }
    }

    fn filter(host_name: Option<&str>, return_headers: bool) -> AuthFilter {
        let shopify = ShopifyConfig {
            host_scheme: None,
            host_name: host_name.map(String::from),
        };
        AuthFilter::new(&shopify, "/api", options(return_headers))
    }

    fn app(filter: AuthFilter, mode: AccessMode) -> Router {
        Router::new()
            .route(
                "/fail",
                get(move || async move {
                    Err::<(), _>(
                        ShopifyAuthException::new("store.myshopify.com", mode)
                            .with_message("Session expired"),
                    )
                }),
            )
            .route("/ok", get(|| async { "fine" }))
            .layer(from_fn_with_state(filter, auth_exception_filter))
    }

    fn get_request(uri: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .uri(uri)
            .header(HOST, "app.example.com")
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url(&["", "", "auth"]), "/auth");
        assert_eq!(join_url(&["/api/", "/offline", "auth"]), "/api/offline/auth");
        assert_eq!(join_url(&["api", "", "online/", "auth"]), "/api/online/auth");
        assert_eq!(join_url(&[]), "/");
    }

    #[test]
    fn test_header_names_match_shared_constants() {
        assert!(REAUTHORIZE.as_str().eq_ignore_ascii_case(REAUTHORIZE_HEADER));
        assert!(
            REAUTHORIZE_URL
                .as_str()
                .eq_ignore_ascii_case(REAUTHORIZE_URL_HEADER)
        );
    }

    #[test]
    fn test_auth_url_uses_configured_host() {
        let exception = ShopifyAuthException::new("store.myshopify.com", AccessMode::Offline);
        let url = filter(Some("configured.example.com"), false)
            .auth_url(&exception, Some("request.example.com"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://configured.example.com/offline/auth?shop=store.myshopify.com"
        );
    }

    #[test]
    fn test_auth_url_falls_back_to_request_host_and_global_prefix() {
        let exception = ShopifyAuthException::new("store.myshopify.com", AccessMode::Online);
        let url = filter(None, false)
            .auth_url(&exception, Some("request.example.com:8080"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://request.example.com:8080/api/online/auth?shop=store.myshopify.com"
        );
    }

    #[test]
    fn test_auth_url_custom_scheme() {
        let shopify = ShopifyConfig {
            host_scheme: Some("http".to_string()),
            host_name: Some("localhost:3000".to_string()),
        };
        let filter = AuthFilter::new(&shopify, "", AuthModuleOptions::default());
        let exception = ShopifyAuthException::new("store.myshopify.com", AccessMode::Offline);
        assert_eq!(
            filter.auth_url(&exception, None).unwrap().as_str(),
            "http://localhost:3000/auth?shop=store.myshopify.com"
        );
    }

    #[test]
    fn test_auth_url_encodes_shop() {
        let exception = ShopifyAuthException::new("a&b=c", AccessMode::Offline);
        let url = filter(Some("app.example.com"), false)
            .auth_url(&exception, None)
            .unwrap();
        assert_eq!(url.query(), Some("shop=a%26b%3Dc"));
    }

    #[test]
    fn test_auth_url_missing_host() {
        let exception = ShopifyAuthException::new("store.myshopify.com", AccessMode::Offline);
        assert!(matches!(
            filter(None, false).auth_url(&exception, None),
            Err(AuthUrlError::MissingHost)
        ));
    }

    #[tokio::test]
    async fn test_offline_exception_redirects() {
        let response = app(filter(None, false), AccessMode::Offline)
            .oneshot(get_request("/fail"))
            .await
            .unwrap();

        let expected = "https://app.example.com/offline/auth?shop=store.myshopify.com";
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(LOCATION).unwrap(), expected);
        assert!(response.headers().get(REAUTHORIZE_HEADER).is_none());

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, format!("Redirecting to {expected}").as_bytes());
    }

    #[tokio::test]
    async fn test_online_exception_returns_json() {
        let response = app(filter(None, false), AccessMode::Online)
            .oneshot(get_request("/fail"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(LOCATION).is_none());

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Session expired");
        assert_eq!(json["statusCode"], 401);
        let timestamp = json["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_return_headers_sets_reauthorize_pair() {
        let response = app(filter(None, true), AccessMode::Online)
            .oneshot(get_request("/fail"))
            .await
            .unwrap();

        assert_eq!(response.headers().get(REAUTHORIZE_HEADER).unwrap(), "1");
        assert_eq!(
            response.headers().get(REAUTHORIZE_URL_HEADER).unwrap(),
            "https://app.example.com/api/online/auth?shop=store.myshopify.com"
        );
    }

    #[tokio::test]
    async fn test_return_headers_on_offline_redirect() {
        let response = app(filter(None, true), AccessMode::Offline)
            .oneshot(get_request("/fail"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(REAUTHORIZE_URL_HEADER),
            response.headers().get(LOCATION)
        );
    }

    #[tokio::test]
    async fn test_other_responses_pass_through() {
        let response = app(filter(None, true), AccessMode::Online)
            .oneshot(get_request("/ok"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(REAUTHORIZE_HEADER).is_none());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, "fine".as_bytes());
    }

    #[tokio::test]
    async fn test_missing_host_is_server_error() {
        let request = HttpRequest::builder()
            .uri("/fail")
            .body(Body::empty())
            .unwrap();
        let response = app(filter(None, false), AccessMode::Offline)
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
