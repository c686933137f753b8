//! REST client for the admin API.
//!
//! One method per endpoint. Every response body is wrapped as `{ "data": ... }`;
//! list endpoints wrap a [`ListResponse`]. The session token from the shared
//! [`CookieJar`] is sent as a bearer token on every request.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use upbreed_core::models::{
    Blog, BlogFilter, Category, Course, CoursePatch, DashboardData, DataEnvelope, Instructor,
    InstructorDetails, LoginRequest, LoginResponse, NewBlog, NewCourse, NewInstructor,
    Transaction, Video, VideoInput,
};
use upbreed_core::pagination::{ListResponse, PageRequest};
use upbreed_core::types::ResourceId;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::multipart;
use crate::session::CookieJar;

/// HTTP client for the admin API.
#[derive(Clone)]
pub struct AdminApi {
    client: reqwest::Client,
    base_url: Url,
    jar: Arc<CookieJar>,
}

impl AdminApi {
    /// Build a client with the configured per-request timeout.
    pub fn new(config: &ClientConfig, jar: Arc<CookieJar>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config.base_url.clone(), jar))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: Url, jar: Arc<CookieJar>) -> Self {
        Self {
            client,
            base_url,
            jar,
        }
    }

    pub fn jar(&self) -> &Arc<CookieJar> {
        &self.jar
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ---- auth ----

    /// `POST /auth/login`. The caller stores the returned token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            device_signature: self.jar.device_signature().to_string(),
        };
        let response = self
            .request(Method::POST, &["auth", "login"])
            .json(&body)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    // ---- courses ----

    /// `GET /course`, or `GET /course/search?query=` when `search` is set.
    pub async fn list_courses(
        &self,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<ListResponse<Course>, ApiError> {
        self.list_searchable("course", page, search).await
    }

    pub async fn get_course(&self, id: ResourceId) -> Result<Course, ApiError> {
        let response = self
            .request(Method::GET, &["course", &id.to_string()])
            .send()
            .await?;
        Self::parse_data(response).await
    }

    /// `POST /course` as multipart.
    pub async fn create_course(&self, course: &NewCourse) -> Result<Course, ApiError> {
        let response = self
            .request(Method::POST, &["course"])
            .multipart(multipart::course_form(course)?)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    /// `PATCH /course/:id` with only the changed fields.
    ///
    /// A patch carrying a new image goes out as multipart; otherwise JSON.
    pub async fn edit_course(&self, id: ResourceId, patch: &CoursePatch) -> Result<Course, ApiError> {
        let request = self.request(Method::PATCH, &["course", &id.to_string()]);
        let request = if patch.image.is_some() {
            request.multipart(multipart::course_patch_form(patch)?)
        } else {
            request.json(patch)
        };
        Self::parse_data(request.send().await?).await
    }

    pub async fn delete_course(&self, id: ResourceId) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &["course", &id.to_string()])
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// `GET /course/:id/video`.
    pub async fn get_videos(&self, course_id: ResourceId) -> Result<Vec<Video>, ApiError> {
        let response = self
            .request(Method::GET, &["course", &course_id.to_string(), "video"])
            .send()
            .await?;
        Self::parse_data(response).await
    }

    /// `PATCH /course/:id/videos`. The list order is the lesson order.
    pub async fn edit_videos(
        &self,
        course_id: ResourceId,
        videos: &[VideoInput],
    ) -> Result<Vec<Video>, ApiError> {
        let body = serde_json::json!({ "videos": videos });
        let response = self
            .request(Method::PATCH, &["course", &course_id.to_string(), "videos"])
            .json(&body)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    // ---- instructors ----

    /// `GET /instructor`, or `GET /instructor/search?query=` when `search` is set.
    pub async fn list_instructors(
        &self,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<ListResponse<Instructor>, ApiError> {
        self.list_searchable("instructor", page, search).await
    }

    pub async fn get_instructor(&self, id: ResourceId) -> Result<InstructorDetails, ApiError> {
        let response = self
            .request(Method::GET, &["instructor", &id.to_string()])
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn create_instructor(&self, instructor: &NewInstructor) -> Result<Instructor, ApiError> {
        let response = self
            .request(Method::POST, &["instructor"])
            .multipart(multipart::instructor_form(instructor)?)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn edit_instructor(
        &self,
        id: ResourceId,
        instructor: &NewInstructor,
    ) -> Result<Instructor, ApiError> {
        let response = self
            .request(Method::PATCH, &["instructor", &id.to_string()])
            .multipart(multipart::instructor_form(instructor)?)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    /// `DELETE /instructor/:id`. The server deactivates the instructor.
    pub async fn delete_instructor(&self, id: ResourceId) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &["instructor", &id.to_string()])
            .send()
            .await?;
        Self::check_status(response).await
    }

    // ---- categories ----

    pub async fn list_categories(&self, page: PageRequest) -> Result<ListResponse<Category>, ApiError> {
        let mut url = self.endpoint(&["category"]);
        url.query_pairs_mut()
            .append_pair("page", &page.page.to_string())
            .append_pair("limit", &page.limit.to_string());
        let response = self.request_url(Method::GET, url).send().await?;
        Self::parse_data(response).await
    }

    // ---- blogs ----

    /// `GET /blog` with type, publication, category, search and page filters.
    pub async fn list_blogs(&self, filter: &BlogFilter) -> Result<ListResponse<Blog>, ApiError> {
        let mut url = self.endpoint(&["blog"]);
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("page", &filter.page.page.to_string())
                .append_pair("limit", &filter.page.limit.to_string())
                .append_pair("type", filter.kind.as_str());
            if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
                query.append_pair("search", search);
            }
            if let Some(published) = filter.published.as_param() {
                query.append_pair("isPublished", &published.to_string());
            }
            if let Some(category_id) = filter.category_id {
                query.append_pair("categoryId", &category_id.to_string());
            }
        }
        let response = self.request_url(Method::GET, url).send().await?;
        Self::parse_data(response).await
    }

    pub async fn get_blog(&self, id: ResourceId) -> Result<Blog, ApiError> {
        let response = self
            .request(Method::GET, &["blog", &id.to_string()])
            .send()
            .await?;
        Self::parse_data(response).await
    }

    /// `POST /blog` as multipart.
    pub async fn publish_blog(&self, blog: &NewBlog) -> Result<Blog, ApiError> {
        let response = self
            .request(Method::POST, &["blog"])
            .multipart(multipart::blog_form(blog)?)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn update_blog(&self, id: ResourceId, blog: &NewBlog) -> Result<Blog, ApiError> {
        let response = self
            .request(Method::PATCH, &["blog", &id.to_string()])
            .multipart(multipart::blog_form(blog)?)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn delete_blog(&self, id: ResourceId) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &["blog", &id.to_string()])
            .send()
            .await?;
        Self::check_status(response).await
    }

    // ---- dashboard & finance ----

    pub async fn dashboard(&self) -> Result<DashboardData, ApiError> {
        let response = self.request(Method::GET, &["dashboard"]).send().await?;
        Self::parse_data(response).await
    }

    pub async fn list_transactions(
        &self,
        page: PageRequest,
    ) -> Result<ListResponse<Transaction>, ApiError> {
        let mut url = self.endpoint(&["transaction"]);
        url.query_pairs_mut()
            .append_pair("page", &page.page.to_string())
            .append_pair("limit", &page.limit.to_string());
        let response = self.request_url(Method::GET, url).send().await?;
        Self::parse_data(response).await
    }

    // ---- private helpers ----

    async fn list_searchable<T: DeserializeOwned>(
        &self,
        resource: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<ListResponse<T>, ApiError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let mut url = match search {
            Some(_) => self.endpoint(&[resource, "search"]),
            None => self.endpoint(&[resource]),
        };
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("page", &page.page.to_string())
                .append_pair("limit", &page.limit.to_string());
            if let Some(term) = search {
                query.append_pair("query", term);
            }
        }
        let response = self.request_url(Method::GET, url).send().await?;
        Self::parse_data(response).await
    }

    /// `base_url` joined with the given path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.request_url(method, self.endpoint(segments))
    }

    fn request_url(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(method = %method, url = %url, "API request");
        let builder = self.client.request(method, url);
        match self.jar.auth_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Status`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::debug!(status = status.as_u16(), "API request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful `{ "data": T }` body.
    async fn parse_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        let envelope: DataEnvelope<T> = serde_json::from_slice(&bytes)?;
        Ok(envelope.data)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> AdminApi {
        let config = ClientConfig::new(Url::parse(base).unwrap());
        AdminApi::new(&config, Arc::new(CookieJar::new())).unwrap()
    }

    #[test]
    fn endpoint_joins_segments() {
        let api = api("http://api.test");
        assert_eq!(
            api.endpoint(&["course", "7", "video"]).as_str(),
            "http://api.test/course/7/video"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let api = api("http://api.test/v1/");
        assert_eq!(api.endpoint(&["blog"]).as_str(), "http://api.test/v1/blog");
    }
}
