//! Cache keys of every server query the screens make.
//!
//! Mutations invalidate by family (`Resource::Instructors`), so each
//! family's keys only need to be unique among themselves.

use upbreed_core::models::BlogFilter;
use upbreed_core::pagination::PageRequest;
use upbreed_core::query_key::{QueryKey, Resource};
use upbreed_core::types::ResourceId;

fn paged(resource: Resource, page: PageRequest) -> QueryKey {
    QueryKey::new(resource)
        .with("page", Some(page.page))
        .with("limit", Some(page.limit))
}

pub fn courses(page: PageRequest, search: Option<&str>) -> QueryKey {
    paged(Resource::Courses, page).with("search", search)
}

pub fn course(id: ResourceId) -> QueryKey {
    QueryKey::new(Resource::Course).with("id", Some(id))
}

pub fn videos(course_id: ResourceId) -> QueryKey {
    QueryKey::new(Resource::Videos).with("courseId", Some(course_id))
}

pub fn instructors(page: PageRequest, search: Option<&str>) -> QueryKey {
    paged(Resource::Instructors, page).with("search", search)
}

pub fn instructor(id: ResourceId) -> QueryKey {
    QueryKey::new(Resource::Instructor).with("id", Some(id))
}

pub fn categories(page: PageRequest) -> QueryKey {
    paged(Resource::Categories, page)
}

pub fn blogs(filter: &BlogFilter) -> QueryKey {
    paged(Resource::Blogs, filter.page)
        .with("type", Some(filter.kind.as_str()))
        .with("isPublished", filter.published.as_param())
        .with("categoryId", filter.category_id)
        .with("search", filter.search.as_deref())
}

pub fn blog(id: ResourceId) -> QueryKey {
    QueryKey::new(Resource::Blog).with("id", Some(id))
}

pub fn dashboard() -> QueryKey {
    QueryKey::new(Resource::DashboardData)
}

pub fn transactions(page: PageRequest) -> QueryKey {
    paged(Resource::Transactions, page)
}

#[cfg(test)]
mod tests {
    use upbreed_core::models::{BlogKind, PublishedFilter};
    use upbreed_core::query_key::KeyFilter;

    use super::*;

    #[test]
    fn empty_search_is_the_all_key() {
        let page = PageRequest::new(2, 9);
        assert_eq!(courses(page, None), courses(page, None));
        assert_ne!(courses(page, None), courses(page, Some("music")));
        assert_eq!(courses(page, None).param("search"), None);
    }

    #[test]
    fn every_blog_filter_is_part_of_the_key() {
        let mut filter = BlogFilter {
            kind: BlogKind::News,
            published: PublishedFilter::Drafts,
            ..BlogFilter::default()
        };
        let drafts = blogs(&filter);
        filter.published = PublishedFilter::Published;
        assert_ne!(drafts, blogs(&filter));
        assert!(drafts.matches(&KeyFilter::family(Resource::Blogs)));
    }
}
