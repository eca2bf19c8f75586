//! Bearer-token guard for shop registration.
//!
//! `POST /api/shops` overwrites a shop's offline token, so it only accepts
//! requests carrying `Authorization: Bearer <APP_REGISTRATION_TOKEN>`. With
//! no token configured the endpoint rejects everything.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;

use crate::state::AppState;

/// Extractor that requires the configured registration token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(_auth: RequireRegistrationToken) -> impl IntoResponse {
///     "registered"
/// }
/// ```
#[derive(Debug)]
pub struct RequireRegistrationToken;

/// Error returned when the registration token is missing or wrong.
#[derive(Debug, PartialEq, Eq)]
pub enum RegistrationRejection {
    /// No token configured on the server.
    Disabled,
    /// Missing or mismatched bearer token.
    Unauthorized,
}

impl IntoResponse for RegistrationRejection {
    fn into_response(self) -> Response {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

impl FromRequestParts<AppState> for RequireRegistrationToken {
    type Rejection = RegistrationRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config().registration_token.as_ref() else {
            tracing::warn!("Shop registration attempted without APP_REGISTRATION_TOKEN set");
            return Err(RegistrationRejection::Disabled);
        };

        let provided = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(RegistrationRejection::Unauthorized)?;

        if !constant_time_compare(provided, expected.expose_secret()) {
            tracing::warn!("Shop registration rejected: invalid token");
            return Err(RegistrationRejection::Unauthorized);
        }

        Ok(Self)
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("install-secret", "install-secret"));
        assert!(!constant_time_compare("install-secret", "install-secreT"));
        assert!(!constant_time_compare("install-secret", "install"));
    }

    #[test]
    fn test_rejections_are_unauthorized() {
        for rejection in [
            RegistrationRejection::Disabled,
            RegistrationRejection::Unauthorized,
        ] {
            assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }
}
