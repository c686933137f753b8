use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use upbreed_core::models::{Course, CourseInstructor, CoursePatch, Video, VideoInput};
use upbreed_core::pagination::{paginate, ListResponse};
use upbreed_core::types::ResourceId;

use crate::error::{MockError, MockResult};
use crate::form::FormFields;
use crate::handlers::{contains_ci, DataResponse, ListParams};
use crate::state::{MockState, Store};

/// GET /course
pub async fn list_courses(
    State(state): State<MockState>,
    Query(params): Query<ListParams>,
) -> Json<DataResponse<ListResponse<Course>>> {
    let store = state.store();
    Json(DataResponse {
        data: paginate(&store.courses, params.page_request()),
    })
}

/// GET /course/search?query=
pub async fn search_courses(
    State(state): State<MockState>,
    Query(params): Query<ListParams>,
) -> Json<DataResponse<ListResponse<Course>>> {
    let needle = params.needle();
    let matches: Vec<Course> = state
        .store()
        .courses
        .iter()
        .filter(|c| contains_ci(&c.title, &needle))
        .cloned()
        .collect();
    Json(DataResponse {
        data: paginate(&matches, params.page_request()),
    })
}

/// GET /course/{id}
pub async fn get_course(
    State(state): State<MockState>,
    Path(id): Path<ResourceId>,
) -> MockResult<Json<DataResponse<Course>>> {
    let store = state.store();
    let course = find(&store, id)?;
    Ok(Json(DataResponse {
        data: course.clone(),
    }))
}

/// POST /course (multipart)
pub async fn create_course(
    State(state): State<MockState>,
    multipart: Multipart,
) -> MockResult<(StatusCode, Json<DataResponse<Course>>)> {
    let form = FormFields::read(multipart).await?;
    let instructor_id: ResourceId = form
        .required("instructor")?
        .parse()
        .map_err(|_| MockError::BadRequest("`instructor` must be numeric".into()))?;

    let mut store = state.store();
    let instructor = store
        .instructors
        .iter()
        .find(|i| i.id == instructor_id)
        .map(|i| CourseInstructor {
            id: Some(i.id),
            fname: i.fname.clone(),
            lname: i.lname.clone(),
        })
        .ok_or(MockError::NotFound {
            entity: "Instructor",
            id: instructor_id,
        })?;
    let category_ids = form.ids("categories")?.unwrap_or_default();
    let categories = store
        .categories
        .iter()
        .filter(|c| category_ids.contains(&c.id))
        .cloned()
        .collect();

    let course = Course {
        id: store.allocate_id(),
        title: form.required("title")?,
        description: form.required("description")?,
        thumbnail: form.file("image").map(|f| format!("/uploads/{}", f.file_name)),
        is_active: form.flag("isActive").unwrap_or(true),
        instructor,
        categories,
        preview: None,
        videos: Vec::new(),
    };
    store.courses.push(course.clone());
    tracing::info!(course_id = course.id, "Mock course created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// PATCH /course/{id} (JSON, or multipart when a new image is attached)
pub async fn edit_course(
    State(state): State<MockState>,
    Path(id): Path<ResourceId>,
    request: Request,
) -> MockResult<Json<DataResponse<Course>>> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/"));

    let (patch, image) = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| MockError::BadRequest(e.body_text()))?;
        let form = FormFields::read(multipart).await?;
        let patch = CoursePatch {
            title: form.text("title").map(str::to_string),
            description: form.text("description").map(str::to_string),
            categories: form.ids("categories")?,
            image: None,
        };
        (patch, form.file("image").map(|f| f.file_name.clone()))
    } else {
        let Json(patch) = Json::<CoursePatch>::from_request(request, &state)
            .await
            .map_err(|e| MockError::BadRequest(e.body_text()))?;
        (patch, None)
    };

    let mut store = state.store();
    let all_categories = store.categories.clone();
    let course = store
        .courses
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or(MockError::NotFound { entity: "Course", id })?;
    if let Some(title) = patch.title {
        course.title = title;
    }
    if let Some(description) = patch.description {
        course.description = description;
    }
    if let Some(ids) = patch.categories {
        course.categories = all_categories
            .into_iter()
            .filter(|c| ids.contains(&c.id))
            .collect();
    }
    if let Some(file_name) = image {
        course.thumbnail = Some(format!("/uploads/{file_name}"));
    }
    Ok(Json(DataResponse {
        data: course.clone(),
    }))
}

/// DELETE /course/{id}
pub async fn delete_course(
    State(state): State<MockState>,
    Path(id): Path<ResourceId>,
) -> MockResult<StatusCode> {
    let mut store = state.store();
    let before = store.courses.len();
    store.courses.retain(|c| c.id != id);
    if store.courses.len() == before {
        return Err(MockError::NotFound { entity: "Course", id });
    }
    store.videos.remove(&id);
    tracing::info!(course_id = id, "Mock course deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /course/{id}/video
pub async fn get_videos(
    State(state): State<MockState>,
    Path(id): Path<ResourceId>,
) -> MockResult<Json<DataResponse<Vec<Video>>>> {
    let store = state.store();
    find(&store, id)?;
    Ok(Json(DataResponse {
        data: store.videos.get(&id).cloned().unwrap_or_default(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct VideosBody {
    pub videos: Vec<VideoInput>,
}

/// PATCH /course/{id}/videos: replaces the ordered lesson list.
pub async fn edit_videos(
    State(state): State<MockState>,
    Path(id): Path<ResourceId>,
    Json(body): Json<VideosBody>,
) -> MockResult<Json<DataResponse<Vec<Video>>>> {
    let mut store = state.store();
    find(&store, id)?;
    let mut videos = Vec::with_capacity(body.videos.len());
    for input in body.videos {
        videos.push(Video {
            id: store.allocate_id(),
            title: input.title,
            description: input.description,
            bunny_video_id: input.bunny_video_id,
            is_trailer: input.is_trailer,
            is_public: input.is_public,
        });
    }
    store.videos.insert(id, videos.clone());
    Ok(Json(DataResponse { data: videos }))
}

fn find(store: &Store, id: ResourceId) -> MockResult<&Course> {
    store
        .courses
        .iter()
        .find(|c| c.id == id)
        .ok_or(MockError::NotFound { entity: "Course", id })
}
