//! Page requests and pagination metadata.
//!
//! List endpoints accept `page` and `limit` and answer with a `data` array
//! plus `metadata.lastPage`. Pages are 1-based.

use serde::{Deserialize, Serialize};

/// Default number of items per page on resource screens.
pub const DEFAULT_PAGE_LIMIT: u32 = 9;

/// Upper bound accepted for `limit`.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// A requested page of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Build a request, clamping `page` to at least 1 and `limit` into
    /// `1..=MAX_PAGE_LIMIT`.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Zero-based index of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_LIMIT)
    }
}

/// Pagination metadata attached to every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub last_page: u32,
}

impl PageMetadata {
    /// Compute metadata for `total` items under `request`.
    ///
    /// `last_page` is never below 1 so an empty list still has one page.
    pub fn for_total(total: u64, request: PageRequest) -> Self {
        let limit = u64::from(request.limit);
        let last_page = total.div_ceil(limit).max(1);
        Self {
            page: request.page,
            limit: request.limit,
            total,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.last_page
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// `{ data: [...], metadata: {...} }` list envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub metadata: PageMetadata,
}

impl<T> ListResponse<T> {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Slice a full collection into the requested page.
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> ListResponse<T> {
    let metadata = PageMetadata::for_total(items.len() as u64, request);
    let data = items
        .iter()
        .skip(request.offset())
        .take(request.limit as usize)
        .cloned()
        .collect();
    ListResponse { data, metadata }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_page_of_twenty_at_nine() {
        let items: Vec<u32> = (1..=20).collect();
        let page = paginate(&items, PageRequest::new(2, 9));

        assert_eq!(page.data, (10..=18).collect::<Vec<_>>());
        assert_eq!(page.metadata.last_page, 3);
        assert_eq!(page.metadata.total, 20);
        assert!(page.metadata.has_next());
        assert!(page.metadata.has_previous());
    }

    #[test]
    fn last_page_is_partial() {
        let items: Vec<u32> = (1..=20).collect();
        let page = paginate(&items, PageRequest::new(3, 9));
        assert_eq!(page.data, vec![19, 20]);
        assert!(!page.metadata.has_next());
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let items: Vec<u32> = (1..=5).collect();
        let page = paginate(&items, PageRequest::new(4, 9));
        assert!(page.is_empty());
        assert_eq!(page.metadata.last_page, 1);
    }

    #[test]
    fn empty_collection_has_one_page() {
        let page = paginate::<u32>(&[], PageRequest::default());
        assert!(page.is_empty());
        assert_eq!(page.metadata.last_page, 1);
    }

    #[test]
    fn page_zero_is_clamped_to_first() {
        let request = PageRequest::new(0, 0);
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 1);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn metadata_uses_camel_case_on_the_wire() {
        let meta = PageMetadata::for_total(20, PageRequest::new(1, 9));
        let json = serde_json::to_value(meta).unwrap();
        assert_eq!(json["lastPage"], 3);
    }
}
