//! Core types for the Shopify app.

pub mod access_mode;
pub mod shop_domain;
pub mod shop_id;

pub use access_mode::{AccessMode, AccessModeError};
pub use shop_domain::{ShopDomain, ShopDomainError};
pub use shop_id::ShopId;
