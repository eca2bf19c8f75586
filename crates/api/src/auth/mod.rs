//! Shopify auth failure handling.
//!
//! Handlers and guards signal a lost or missing authorization by returning a
//! [`ShopifyAuthException`]. The [`auth_exception_filter`] middleware turns
//! that into the response the embedded app expects:
//!
//! - offline mode: `302 Found` to the auth URL
//! - online mode: a JSON error body, optionally with reauthorize headers
//!
//! # Middleware Order
//!
//! The filter must wrap every route that can fail authentication, so it is
//! layered on the whole router:
//!
//! ```rust,ignore
//! Router::new()
//!     .merge(routes::routes())
//!     .layer(axum::middleware::from_fn_with_state(
//!         state.auth_filter().clone(),
//!         auth::auth_exception_filter,
//!     ))
//! ```

mod exception;
mod filter;
mod guard;
mod options;
mod registration;

pub use exception::ShopifyAuthException;
pub use filter::{AuthFilter, AuthUrlError, auth_exception_filter, join_url};
pub use guard::{AuthMode, AuthRejection, Offline, Online, ShopifyAuth, authorize};
pub use options::{AuthModuleOptions, AuthOptions};
pub use registration::{RegistrationRejection, RequireRegistrationToken};
