use crate::error::FetchError;

/// Three-way view state of anything fetched from the server.
///
/// Computed once per update from the underlying query states; a view is in
/// exactly one of these branches.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Pending,
    Error(FetchError),
    Ready(T),
}

impl<T> Loadable<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loadable<U> {
        match self {
            Self::Pending => Loadable::Pending,
            Self::Error(e) => Loadable::Error(e),
            Self::Ready(value) => Loadable::Ready(f(value)),
        }
    }

    pub fn as_ref(&self) -> Loadable<&T> {
        match self {
            Self::Pending => Loadable::Pending,
            Self::Error(e) => Loadable::Error(e.clone()),
            Self::Ready(value) => Loadable::Ready(value),
        }
    }
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self::Pending
    }
}

impl<T> From<Result<T, FetchError>> for Loadable<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) => Self::Error(e),
        }
    }
}
