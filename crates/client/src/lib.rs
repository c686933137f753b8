//! Typed REST client for the Upbreed admin API.
//!
//! - [`AdminApi`]: one method per endpoint, built on [`reqwest`].
//! - [`session`]: the client-side cookie jar, the `rf` session cookie and
//!   the route guard that redirects to login when it is missing.
//! - [`ClientConfig`]: environment-driven configuration.

pub mod api;
pub mod config;
pub mod error;
pub mod files;
mod multipart;
pub mod session;

pub use api::AdminApi;
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use reqwest::Url;
pub use session::{AuthGuard, CookieJar, Redirect, Session, AUTH_COOKIE};
