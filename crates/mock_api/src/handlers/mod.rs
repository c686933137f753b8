pub mod auth;
pub mod blogs;
pub mod categories;
pub mod courses;
pub mod finance;
pub mod instructors;

use serde::{Deserialize, Serialize};
use upbreed_core::pagination::{PageRequest, DEFAULT_PAGE_LIMIT};

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `?page=&limit=&query=` on list and search endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub query: Option<String>,
}

impl ListParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        )
    }

    /// Lowercased search needle; empty when no query was sent.
    pub fn needle(&self) -> String {
        self.query.as_deref().unwrap_or("").trim().to_lowercase()
    }
}

pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
