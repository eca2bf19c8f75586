//! Shopify app core - shared types.
//!
//! This crate provides the types shared by every part of the app:
//! - `api` - axum server persisting shops and sessions
//! - `client` - fetch wrapper for the embedded app frontend
//! - `cli` - migrations and shop management
//!
//! # Architecture
//!
//! The core crate contains only types and constants - no I/O, no database
//! access, no HTTP clients.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, shop domains, and access modes
//! - [`reauthorize`] - The reauthorize header convention shared by server and client

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod reauthorize;
pub mod types;

pub use types::*;
