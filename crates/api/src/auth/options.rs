//! Per access mode auth options.

use shopify_app_core::AccessMode;

/// Options for one auth flow (online or offline).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthOptions {
    /// Path the auth routes are mounted under, e.g. `/offline`.
    pub base_path: String,
    /// Prefix the auth URL with the application's global prefix.
    pub use_global_prefix: bool,
    /// Add the reauthorize headers to failure responses.
    pub return_headers: bool,
}

/// Auth options for both access modes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthModuleOptions {
    /// Options for user-scoped auth.
    pub online: AuthOptions,
    /// Options for shop-scoped auth.
    pub offline: AuthOptions,
}

impl AuthModuleOptions {
    /// The options registered for an access mode.
    #[must_use]
    pub const fn for_mode(&self, mode: AccessMode) -> &AuthOptions {
        match mode {
            AccessMode::Online => &self.online,
            AccessMode::Offline => &self.offline,
        }
    }
}
