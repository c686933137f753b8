use std::sync::Arc;

use upbreed_client::ApiError;

/// A failed fetch or mutation, as stored in cache entries and view states.
///
/// Cheap to clone: every observer of a key sees the same error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    message: Arc<str>,
    status: Option<u16>,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Arc::from(message.into()),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// A cached body did not decode into the requested type.
    pub fn decode(err: serde_json::Error) -> Self {
        Self::new(format!("Unexpected data shape: {err}"))
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status when the server answered.
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

impl From<ApiError> for FetchError {
    fn from(err: ApiError) -> Self {
        let status = err.status();
        Self {
            message: Arc::from(err.to_string()),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_status_from_api_error() {
        let err = FetchError::from(ApiError::Status {
            status: 404,
            body: "missing".into(),
        });
        assert_eq!(err.status(), Some(404));
        assert!(err.message().contains("missing"));
    }
}
