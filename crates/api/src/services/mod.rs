//! Business logic services.
//!
//! Services sit between route handlers and repositories:
//!
//! - [`shops`] - Shop registration and token refresh
//! - [`sessions`] - Shopify session storage

pub mod sessions;
pub mod shops;

pub use sessions::{SessionStorage, offline_session_id};
pub use shops::ShopsService;
