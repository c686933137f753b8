//! List sources behind the paginated, searchable screens.

use async_trait::async_trait;
use upbreed_client::{AdminApi, ApiError};
use upbreed_core::models::{Blog, BlogFilter, BlogKind, Course, Instructor, PublishedFilter};
use upbreed_core::pagination::{ListResponse, PageRequest};
use upbreed_core::query_key::QueryKey;
use upbreed_core::types::ResourceId;
use upbreed_query::ListSource;

use crate::keys;

pub struct CourseSource {
    api: AdminApi,
}

impl CourseSource {
    pub fn new(api: AdminApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ListSource for CourseSource {
    type Item = Course;

    fn all_key(&self, page: PageRequest) -> QueryKey {
        keys::courses(page, None)
    }

    fn search_key(&self, page: PageRequest, term: &str) -> QueryKey {
        keys::courses(page, Some(term))
    }

    async fn fetch_all(&self, page: PageRequest) -> Result<ListResponse<Course>, ApiError> {
        self.api.list_courses(page, None).await
    }

    async fn fetch_search(
        &self,
        page: PageRequest,
        term: &str,
    ) -> Result<ListResponse<Course>, ApiError> {
        self.api.list_courses(page, Some(term)).await
    }
}

pub struct InstructorSource {
    api: AdminApi,
}

impl InstructorSource {
    pub fn new(api: AdminApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ListSource for InstructorSource {
    type Item = Instructor;

    fn all_key(&self, page: PageRequest) -> QueryKey {
        keys::instructors(page, None)
    }

    fn search_key(&self, page: PageRequest, term: &str) -> QueryKey {
        keys::instructors(page, Some(term))
    }

    async fn fetch_all(&self, page: PageRequest) -> Result<ListResponse<Instructor>, ApiError> {
        self.api.list_instructors(page, None).await
    }

    async fn fetch_search(
        &self,
        page: PageRequest,
        term: &str,
    ) -> Result<ListResponse<Instructor>, ApiError> {
        self.api.list_instructors(page, Some(term)).await
    }
}

/// Blog posts of one section, optionally narrowed by publish state and
/// category. Search goes through the same endpoint's `search` param.
pub struct BlogSource {
    api: AdminApi,
    kind: BlogKind,
    published: PublishedFilter,
    category_id: Option<ResourceId>,
}

impl BlogSource {
    pub fn new(api: AdminApi, kind: BlogKind, published: PublishedFilter) -> Self {
        Self {
            api,
            kind,
            published,
            category_id: None,
        }
    }

    pub fn in_category(mut self, category_id: Option<ResourceId>) -> Self {
        self.category_id = category_id;
        self
    }

    fn filter(&self, page: PageRequest, search: Option<&str>) -> BlogFilter {
        BlogFilter {
            kind: self.kind,
            published: self.published,
            category_id: self.category_id,
            search: search.map(str::to_string),
            page,
        }
    }
}

#[async_trait]
impl ListSource for BlogSource {
    type Item = Blog;

    fn all_key(&self, page: PageRequest) -> QueryKey {
        keys::blogs(&self.filter(page, None))
    }

    fn search_key(&self, page: PageRequest, term: &str) -> QueryKey {
        keys::blogs(&self.filter(page, Some(term)))
    }

    async fn fetch_all(&self, page: PageRequest) -> Result<ListResponse<Blog>, ApiError> {
        self.api.list_blogs(&self.filter(page, None)).await
    }

    async fn fetch_search(
        &self,
        page: PageRequest,
        term: &str,
    ) -> Result<ListResponse<Blog>, ApiError> {
        self.api.list_blogs(&self.filter(page, Some(term))).await
    }
}
