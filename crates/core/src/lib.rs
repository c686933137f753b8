//! Upbreed admin domain core.
//!
//! Pure logic shared by the API client, the query/mutation layer and the
//! admin front-end. Nothing in this crate performs I/O:
//!
//! - [`models`]: server-shaped records and write payloads.
//! - [`query_key`]: structural cache keys and partial-match filters.
//! - [`pagination`]: page requests and `lastPage` metadata.
//! - [`validation`]: form schemas and image upload checks.
//! - [`diff`]: field-level change detection for edit forms.
//! - [`reorder`]: drag-and-drop list moves.
//! - [`charts`]: revenue / subscriber series reshaping for display.
//! - [`routes`]: the admin route table.

pub mod charts;
pub mod diff;
pub mod error;
pub mod models;
pub mod pagination;
pub mod query_key;
pub mod reorder;
pub mod routes;
pub mod types;
pub mod validation;
