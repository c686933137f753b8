//! Upbreed admin screens wired to the API client and the query layer.
//!
//! [`AdminApp`] owns the shared pieces (client, cookie jar, cache, toasts,
//! navigator, URL state). Each module under [`screens`] builds one screen's
//! lists, dialogs and forms from it. [`cli`] drives the screens from a
//! terminal.

pub mod app;
pub mod cli;
pub mod keys;
pub mod screens;
pub mod sources;

pub use app::AdminApp;
pub use screens::FormOutcome;
