//! Reauthorize signal shared by the server and the embedded app client.
//!
//! When a request fails because the app has lost authorization, the server
//! sets [`REAUTHORIZE_HEADER`] to [`REAUTHORIZE_VALUE`] and
//! [`REAUTHORIZE_URL_HEADER`] to the URL that restarts the auth flow. The
//! client watches for the pair and navigates the top frame there.
//!
//! Header names are compared case-insensitively on both ends.

/// Set to [`REAUTHORIZE_VALUE`] when the caller must restart authentication.
pub const REAUTHORIZE_HEADER: &str = "X-Shopify-Api-Request-Failure-Reauthorize";

/// Carries the absolute URL that restarts the auth flow.
pub const REAUTHORIZE_URL_HEADER: &str = "X-Shopify-API-Request-Failure-Reauthorize-Url";

/// The only value of [`REAUTHORIZE_HEADER`] that triggers a redirect.
pub const REAUTHORIZE_VALUE: &str = "1";

/// Where the client sends the user when no URL header is present.
pub const DEFAULT_AUTH_PATH: &str = "/auth";

/// Returns `true` when a header value is the reauthorize signal.
#[must_use]
pub fn is_reauthorize_signal(value: Option<&str>) -> bool {
    value == Some(REAUTHORIZE_VALUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_exact_one_signals() {
        assert!(is_reauthorize_signal(Some("1")));
        assert!(!is_reauthorize_signal(Some("true")));
        assert!(!is_reauthorize_signal(Some(" 1")));
        assert!(!is_reauthorize_signal(Some("0")));
        assert!(!is_reauthorize_signal(None));
    }
}
