use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use upbreed_core::models::{Blog, BlogCategoryLink, BlogKind};
use upbreed_core::pagination::{paginate, ListResponse, PageRequest, DEFAULT_PAGE_LIMIT};
use upbreed_core::types::ResourceId;

use crate::error::{MockError, MockResult};
use crate::form::FormFields;
use crate::handlers::{contains_ci, DataResponse};
use crate::state::{MockState, Store};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<BlogKind>,
    pub is_published: Option<bool>,
    pub category_id: Option<ResourceId>,
}

impl BlogParams {
    fn admits(&self, blog: &Blog) -> bool {
        let needle = self.search.as_deref().unwrap_or("").trim().to_lowercase();
        self.kind.map_or(true, |k| blog.kind == k)
            && self.is_published.map_or(true, |p| blog.is_published == p)
            && self
                .category_id
                .map_or(true, |id| blog.categories.iter().any(|l| l.category.id == id))
            && contains_ci(&blog.title, &needle)
    }
}

/// GET /blog?type=&isPublished=&categoryId=&search=&page=&limit=
pub async fn list_blogs(
    State(state): State<MockState>,
    Query(params): Query<BlogParams>,
) -> Json<DataResponse<ListResponse<Blog>>> {
    let rows: Vec<Blog> = state
        .store()
        .blogs
        .iter()
        .filter(|b| params.admits(b))
        .cloned()
        .collect();
    let page = PageRequest::new(
        params.page.unwrap_or(1),
        params.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
    );
    Json(DataResponse {
        data: paginate(&rows, page),
    })
}

/// GET /blog/{id}
pub async fn get_blog(
    State(state): State<MockState>,
    Path(id): Path<ResourceId>,
) -> MockResult<Json<DataResponse<Blog>>> {
    let store = state.store();
    let blog = store
        .blogs
        .iter()
        .find(|b| b.id == id)
        .ok_or(MockError::NotFound { entity: "Blog", id })?;
    Ok(Json(DataResponse { data: blog.clone() }))
}

/// POST /blog (multipart)
pub async fn publish_blog(
    State(state): State<MockState>,
    multipart: Multipart,
) -> MockResult<(StatusCode, Json<DataResponse<Blog>>)> {
    let form = FormFields::read(multipart).await?;
    let mut store = state.store();
    let id = store.allocate_id();
    let now = Some(Utc::now());
    let blog = Blog {
        id,
        title: form.required("title")?,
        description: form.required("description")?,
        preview_image: form
            .file("previewImage")
            .map(|f| format!("/uploads/{}", f.file_name)),
        content: form.required("content")?,
        is_published: form.flag("isPublished").unwrap_or(false),
        kind: parse_kind(&form)?.unwrap_or_default(),
        created_at: now,
        updated_at: now,
        categories: category_links(&mut store, &form.ids("categoryIds")?.unwrap_or_default()),
    };
    store.blogs.push(blog.clone());
    tracing::info!(blog_id = id, "Mock blog published");
    Ok((StatusCode::CREATED, Json(DataResponse { data: blog })))
}

/// PATCH /blog/{id} (multipart)
pub async fn update_blog(
    State(state): State<MockState>,
    Path(id): Path<ResourceId>,
    multipart: Multipart,
) -> MockResult<Json<DataResponse<Blog>>> {
    let form = FormFields::read(multipart).await?;
    let kind = parse_kind(&form)?;
    let mut store = state.store();
    let links = match form.ids("categoryIds")? {
        Some(ids) => Some(category_links(&mut store, &ids)),
        None => None,
    };

    let blog = store
        .blogs
        .iter_mut()
        .find(|b| b.id == id)
        .ok_or(MockError::NotFound { entity: "Blog", id })?;
    if let Some(v) = form.text("title") {
        blog.title = v.to_string();
    }
    if let Some(v) = form.text("description") {
        blog.description = v.to_string();
    }
    if let Some(v) = form.text("content") {
        blog.content = v.to_string();
    }
    if let Some(v) = form.flag("isPublished") {
        blog.is_published = v;
    }
    if let Some(kind) = kind {
        blog.kind = kind;
    }
    if let Some(links) = links {
        blog.categories = links;
    }
    if let Some(file) = form.file("previewImage") {
        blog.preview_image = Some(format!("/uploads/{}", file.file_name));
    }
    blog.updated_at = Some(Utc::now());
    Ok(Json(DataResponse { data: blog.clone() }))
}

/// DELETE /blog/{id}
pub async fn delete_blog(
    State(state): State<MockState>,
    Path(id): Path<ResourceId>,
) -> MockResult<StatusCode> {
    let mut store = state.store();
    let before = store.blogs.len();
    store.blogs.retain(|b| b.id != id);
    if store.blogs.len() == before {
        return Err(MockError::NotFound { entity: "Blog", id });
    }
    Ok(StatusCode::NO_CONTENT)
}

fn parse_kind(form: &FormFields) -> MockResult<Option<BlogKind>> {
    form.text("type")
        .map(|v| v.parse().map_err(|_| MockError::BadRequest(format!("unknown blog type `{v}`"))))
        .transpose()
}

fn category_links(store: &mut Store, ids: &[ResourceId]) -> Vec<BlogCategoryLink> {
    let categories: Vec<_> = store
        .categories
        .iter()
        .filter(|c| ids.contains(&c.id))
        .cloned()
        .collect();
    categories
        .into_iter()
        .map(|category| BlogCategoryLink {
            id: store.allocate_id(),
            category,
        })
        .collect()
}
