use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Error type for mock handlers, rendered as `{ "error", "code" }`.
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid email or password")]
    Unauthorized,

    /// A failure scheduled by the test through [`crate::MockState::fail_next`].
    #[error("Injected failure")]
    Injected(StatusCode),
}

pub type MockResult<T> = Result<T, MockError>;

impl From<axum::extract::multipart::MultipartError> for MockError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        Self::BadRequest(e.body_text())
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Injected(status) => (*status, "INJECTED"),
        };
        let body = json!({
            "error": self.to_string(),
            "code": code,
        });
        (status, axum::Json(body)).into_response()
    }
}
