/// Errors from parsing domain values (query params, month keys, reorders).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
