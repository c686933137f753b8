use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use upbreed_core::models::{Instructor, InstructorDetails, InstructorProfile};
use upbreed_core::pagination::{paginate, ListResponse};
use upbreed_core::types::ResourceId;

use crate::error::{MockError, MockResult};
use crate::form::FormFields;
use crate::handlers::{contains_ci, DataResponse, ListParams};
use crate::state::{instructor_row, MockState};

/// GET /instructor: active instructors only.
pub async fn list_instructors(
    State(state): State<MockState>,
    Query(params): Query<ListParams>,
) -> Json<DataResponse<ListResponse<Instructor>>> {
    let rows = state.store().active_instructors();
    Json(DataResponse {
        data: paginate(&rows, params.page_request()),
    })
}

/// GET /instructor/search?query=: matches name or email.
pub async fn search_instructors(
    State(state): State<MockState>,
    Query(params): Query<ListParams>,
) -> Json<DataResponse<ListResponse<Instructor>>> {
    let needle = params.needle();
    let rows: Vec<Instructor> = state
        .store()
        .active_instructors()
        .into_iter()
        .filter(|i| contains_ci(&i.full_name(), &needle) || contains_ci(&i.email, &needle))
        .collect();
    Json(DataResponse {
        data: paginate(&rows, params.page_request()),
    })
}

/// GET /instructor/{id}
pub async fn get_instructor(
    State(state): State<MockState>,
    Path(id): Path<ResourceId>,
) -> MockResult<Json<DataResponse<InstructorDetails>>> {
    let store = state.store();
    let details = store
        .instructors
        .iter()
        .find(|i| i.id == id)
        .ok_or(MockError::NotFound {
            entity: "Instructor",
            id,
        })?;
    Ok(Json(DataResponse {
        data: details.clone(),
    }))
}

/// POST /instructor (multipart)
pub async fn create_instructor(
    State(state): State<MockState>,
    multipart: Multipart,
) -> MockResult<(StatusCode, Json<DataResponse<Instructor>>)> {
    let form = FormFields::read(multipart).await?;
    let now = Some(Utc::now());

    let mut store = state.store();
    let id = store.allocate_id();
    let details = InstructorDetails {
        id,
        fname: form.required("fname")?,
        lname: form.required("lname")?,
        phone: None,
        email: form.required("email")?,
        is_active: true,
        created_at: now,
        updated_at: now,
        deleted_at: None,
        instructor_profile: InstructorProfile {
            id: None,
            linked_in_url: None,
            about: form.required("about")?,
            description: None,
            profile_picture_url: form
                .file("profilePicture")
                .map(|f| format!("/uploads/{}", f.file_name)),
            expertise: None,
            title: None,
        },
    };
    let row = instructor_row(&details);
    store.instructors.push(details);
    tracing::info!(instructor_id = id, "Mock instructor created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: row })))
}

/// PATCH /instructor/{id} (multipart)
pub async fn edit_instructor(
    State(state): State<MockState>,
    Path(id): Path<ResourceId>,
    multipart: Multipart,
) -> MockResult<Json<DataResponse<Instructor>>> {
    let form = FormFields::read(multipart).await?;

    let mut store = state.store();
    let details = store
        .instructors
        .iter_mut()
        .find(|i| i.id == id)
        .ok_or(MockError::NotFound {
            entity: "Instructor",
            id,
        })?;
    if let Some(v) = form.text("fname") {
        details.fname = v.to_string();
    }
    if let Some(v) = form.text("lname") {
        details.lname = v.to_string();
    }
    if let Some(v) = form.text("email") {
        details.email = v.to_string();
    }
    if let Some(v) = form.text("about") {
        details.instructor_profile.about = v.to_string();
    }
    if let Some(file) = form.file("profilePicture") {
        details.instructor_profile.profile_picture_url = Some(format!("/uploads/{}", file.file_name));
    }
    details.updated_at = Some(Utc::now());
    Ok(Json(DataResponse {
        data: instructor_row(details),
    }))
}

/// DELETE /instructor/{id}: deactivates; the row disappears from lists.
pub async fn delete_instructor(
    State(state): State<MockState>,
    Path(id): Path<ResourceId>,
) -> MockResult<StatusCode> {
    let mut store = state.store();
    let details = store
        .instructors
        .iter_mut()
        .find(|i| i.id == id && i.is_active)
        .ok_or(MockError::NotFound {
            entity: "Instructor",
            id,
        })?;
    details.is_active = false;
    details.deleted_at = Some(Utc::now());
    tracing::info!(instructor_id = id, "Mock instructor deactivated");
    Ok(StatusCode::NO_CONTENT)
}
