//! Client side of the Shopify reauthorize handshake.
//!
//! [`UserLoggedInFetch`] wraps an [`AuthenticatedFetch`] and watches every
//! response for the reauthorize signal. When the server asks for it, the
//! wrapper dispatches a remote redirect and swallows the response.
//!
//! ```rust,ignore
//! let fetch = BearerFetch::new(reqwest::Client::new(), session_token);
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let app = UserLoggedInFetch::new(fetch, tx, Url::parse("https://app.example.com")?);
//!
//! match app.fetch("/api/session?shop=store.myshopify.com", FetchOptions::default()).await? {
//!     Some(response) => render(response).await,
//!     None => navigate(rx.recv().await),
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod fetch;
pub mod logged_in;
pub mod redirect;

pub use error::ClientError;
pub use fetch::{AuthenticatedFetch, BearerFetch, FetchOptions, SessionTokenProvider};
pub use logged_in::UserLoggedInFetch;
pub use redirect::Redirect;
