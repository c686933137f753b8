use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::error::MockError;
use crate::handlers::{auth, blogs, categories, courses, finance, instructors};
use crate::state::{FaultKind, MockState, RecordedRequest};

/// Build the mock route tree.
///
/// ```text
/// POST   /auth/login                  login
///
/// GET    /course                      list (paginated)
/// POST   /course                      create (multipart)
/// GET    /course/search?query=        search (paginated)
/// GET    /course/{id}                 detail
/// PATCH  /course/{id}                 edit (JSON or multipart)
/// DELETE /course/{id}                 delete
/// GET    /course/{id}/video           lesson videos
/// PATCH  /course/{id}/videos          replace ordered lesson list
///
/// GET    /instructor                  list active (paginated)
/// POST   /instructor                  create (multipart)
/// GET    /instructor/search?query=    search (paginated)
/// GET    /instructor/{id}             detail
/// PATCH  /instructor/{id}             edit (multipart)
/// DELETE /instructor/{id}             deactivate
///
/// GET    /category                    list (paginated)
///
/// GET    /blog                        list with filters
/// POST   /blog                        publish (multipart)
/// GET    /blog/{id}                   detail
/// PATCH  /blog/{id}                   update (multipart)
/// DELETE /blog/{id}                   delete
///
/// GET    /dashboard                   summary and history
/// GET    /transaction                 transaction history (paginated)
/// ```
pub fn router(state: MockState) -> Router {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route(
            "/course",
            get(courses::list_courses).post(courses::create_course),
        )
        .route("/course/search", get(courses::search_courses))
        .route(
            "/course/{id}",
            get(courses::get_course)
                .patch(courses::edit_course)
                .delete(courses::delete_course),
        )
        .route("/course/{id}/video", get(courses::get_videos))
        .route("/course/{id}/videos", patch(courses::edit_videos))
        .route(
            "/instructor",
            get(instructors::list_instructors).post(instructors::create_instructor),
        )
        .route("/instructor/search", get(instructors::search_instructors))
        .route(
            "/instructor/{id}",
            get(instructors::get_instructor)
                .patch(instructors::edit_instructor)
                .delete(instructors::delete_instructor),
        )
        .route("/category", get(categories::list_categories))
        .route("/blog", get(blogs::list_blogs).post(blogs::publish_blog))
        .route(
            "/blog/{id}",
            get(blogs::get_blog)
                .patch(blogs::update_blog)
                .delete(blogs::delete_blog),
        )
        .route("/dashboard", get(finance::dashboard))
        .route("/transaction", get(finance::list_transactions))
        .layer(middleware::from_fn_with_state(state.clone(), record_and_inject))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Record every request, then apply any scheduled fault for it.
async fn record_and_inject(State(state): State<MockState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    state.record(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        query: request.uri().query().map(str::to_string),
        authorization: request
            .headers()
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    match state.take_fault(&method, &path) {
        Some(FaultKind::Status(status)) => {
            tracing::debug!(%method, %path, status = status.as_u16(), "Injecting failure");
            MockError::Injected(status).into_response()
        }
        Some(FaultKind::Delay(delay)) => {
            tokio::time::sleep(delay).await;
            next.run(request).await
        }
        None => next.run(request).await,
    }
}
