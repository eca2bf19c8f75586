//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `APP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `APP_HOST` - Bind address (default: 127.0.0.1)
//! - `APP_PORT` - Listen port (default: 3000)
//! - `GLOBAL_PREFIX` - Path prefix for every route, e.g. `/api` (default: none)
//! - `APP_REGISTRATION_TOKEN` - Bearer token for `POST /api/shops` (unset disables the endpoint)
//! - `SHOPIFY_HOST_SCHEME` - `http` or `https` used in auth URLs (default: https)
//! - `SHOPIFY_HOST_NAME` - Public host used in auth URLs (default: the request's Host header)
//! - `SHOPIFY_AUTH_ONLINE_BASE_PATH` - Online auth mount path (default: /online)
//! - `SHOPIFY_AUTH_ONLINE_USE_GLOBAL_PREFIX` - Prefix online auth URLs (default: false)
//! - `SHOPIFY_AUTH_ONLINE_RETURN_HEADERS` - Reauthorize headers on online failures (default: true)
//! - `SHOPIFY_AUTH_OFFLINE_BASE_PATH` - Offline auth mount path (default: /offline)
//! - `SHOPIFY_AUTH_OFFLINE_USE_GLOBAL_PREFIX` - Prefix offline auth URLs (default: false)
//! - `SHOPIFY_AUTH_OFFLINE_RETURN_HEADERS` - Reauthorize headers on offline failures (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use crate::auth::{AuthModuleOptions, AuthOptions};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Path prefix for every route (empty for none)
    pub global_prefix: String,
    /// Bearer token required to register shops over HTTP
    pub registration_token: Option<SecretString>,
    /// Shopify host settings
    pub shopify: ShopifyConfig,
    /// Auth options per access mode
    pub auth: AuthModuleOptions,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced by Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Shopify host settings used to build auth URLs.
#[derive(Debug, Clone, Default)]
pub struct ShopifyConfig {
    /// `http` or `https`; `None` means https
    pub host_scheme: Option<String>,
    /// Public host name; `None` means use the request's Host header
    pub host_name: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = get_database_url(env, "APP_DATABASE_URL")?;
        let host = get_or_default(env, "APP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("APP_HOST".to_string(), e.to_string()))?;
        let port = get_or_default(env, "APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("APP_PORT".to_string(), e.to_string()))?;
        let global_prefix = get_optional(env, "GLOBAL_PREFIX").unwrap_or_default();
        let registration_token = get_optional(env, "APP_REGISTRATION_TOKEN").map(SecretString::from);

        Ok(Self {
            database_url,
            host,
            port,
            global_prefix,
            registration_token,
            shopify: ShopifyConfig::from_lookup(env)?,
            auth: AuthModuleOptions {
                online: auth_options(env, "ONLINE", "/online", true)?,
                offline: auth_options(env, "OFFLINE", "/offline", false)?,
            },
            sentry_dsn: get_optional(env, "SENTRY_DSN"),
            sentry_environment: get_optional(env, "SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_sample_rate(env, "SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_sample_rate(env, "SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifyConfig {
    fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host_scheme = get_optional(env, "SHOPIFY_HOST_SCHEME");
        if let Some(scheme) = &host_scheme {
            if scheme != "http" && scheme != "https" {
                return Err(ConfigError::InvalidEnvVar(
                    "SHOPIFY_HOST_SCHEME".to_string(),
                    format!("expected http or https, got {scheme}"),
                ));
            }
        }

        Ok(Self {
            host_scheme,
            host_name: get_optional(env, "SHOPIFY_HOST_NAME"),
        })
    }
}

fn auth_options(
    env: &dyn Fn(&str) -> Option<String>,
    mode: &str,
    default_base_path: &str,
    default_return_headers: bool,
) -> Result<AuthOptions, ConfigError> {
    let key = |suffix: &str| format!("SHOPIFY_AUTH_{mode}_{suffix}");

    Ok(AuthOptions {
        base_path: get_or_default(env, &key("BASE_PATH"), default_base_path),
        use_global_prefix: get_bool(env, &key("USE_GLOBAL_PREFIX"), false)?,
        return_headers: get_bool(env, &key("RETURN_HEADERS"), default_return_headers)?,
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Load only the database URL, for tools that never serve HTTP.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither `APP_DATABASE_URL` nor
/// `DATABASE_URL` is set.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    let _ = dotenvy::dotenv();
    get_database_url(&|key| std::env::var(key).ok(), "APP_DATABASE_URL")
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(
    env: &dyn Fn(&str) -> Option<String>,
    primary_key: &str,
) -> Result<SecretString, ConfigError> {
    get_optional(env, primary_key)
        .or_else(|| get_optional(env, "DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key).filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_or_default(env: &dyn Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional(env, key).unwrap_or_else(|| default.to_string())
}

/// Parse a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`).
fn get_bool(
    env: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(value) = get_optional(env, key) else {
        return Ok(default);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got {other}"),
        )),
    }
}

/// Parse a sample rate in `0.0..=1.0`.
fn get_sample_rate(
    env: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: f32,
) -> Result<f32, ConfigError> {
    let Some(value) = get_optional(env, key) else {
        return Ok(default);
    };

    let rate = value
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}
