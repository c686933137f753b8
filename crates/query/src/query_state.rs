//! Screen state kept in the URL query string.
//!
//! [`QueryStateStore`] is a string map mirrored to and from a URL. Screens
//! read and write it through typed [`QueryParam`]s, each scoped to one name
//! with a default used when the param is absent or unparsable.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::watch;
use upbreed_client::Url;
use upbreed_core::charts::{Currency, FinanceWindow};
use upbreed_core::error::CoreError;
use upbreed_core::models::{BlogKind, PublishedFilter};
use upbreed_core::types::ResourceId;

/// Observable URL query-state.
#[derive(Clone)]
pub struct QueryStateStore {
    params: Arc<watch::Sender<BTreeMap<String, String>>>,
}

impl QueryStateStore {
    pub fn new() -> Self {
        let (params, _) = watch::channel(BTreeMap::new());
        Self {
            params: Arc::new(params),
        }
    }

    /// Replace the whole state with the query of `url`.
    pub fn sync_from_url(&self, url: &Url) {
        let params: BTreeMap<String, String> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        self.params.send_replace(params);
    }

    /// `base` with its query replaced by the current state.
    pub fn to_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        let params = self.params.borrow();
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params.iter());
        }
        url
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.params.borrow().get(name).cloned()
    }

    pub fn set(&self, name: &str, value: impl Into<String>) {
        let value = value.into();
        self.params.send_if_modified(|params| {
            if params.get(name) == Some(&value) {
                return false;
            }
            params.insert(name.to_string(), value);
            true
        });
    }

    pub fn remove(&self, name: &str) {
        self.params
            .send_if_modified(|params| params.remove(name).is_some());
    }

    pub fn subscribe(&self) -> watch::Receiver<BTreeMap<String, String>> {
        self.params.subscribe()
    }

    pub fn param<T>(&self, name: &'static str, default: T) -> QueryParam<T>
    where
        T: FromStr + fmt::Display + Clone,
    {
        QueryParam {
            store: self.clone(),
            name,
            default,
            _marker: PhantomData,
        }
    }
}

/// A typed reader/writer for one query param.
#[derive(Clone)]
pub struct QueryParam<T> {
    store: QueryStateStore,
    name: &'static str,
    default: T,
    _marker: PhantomData<fn() -> T>,
}

impl<T> QueryParam<T>
where
    T: FromStr + fmt::Display + Clone,
{
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The parsed value, if present and valid.
    pub fn value(&self) -> Option<T> {
        let raw = self.store.get(self.name)?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::debug!(param = self.name, value = %raw, "Ignoring unparsable query param");
                None
            }
        }
    }

    /// The value, or the default.
    pub fn get(&self) -> T {
        self.value().unwrap_or_else(|| self.default.clone())
    }

    pub fn set(&self, value: T) {
        self.store.set(self.name, value.to_string());
    }

    pub fn clear(&self) {
        self.store.remove(self.name);
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }
}

impl Default for QueryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Params used by the screens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("asc"),
            Self::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(CoreError::InvalidInput(format!("unknown sort order: {other}"))),
        }
    }
}

impl QueryStateStore {
    pub fn currency(&self) -> QueryParam<Currency> {
        self.param("currency", Currency::Ngn)
    }

    pub fn sort(&self) -> QueryParam<SortOrder> {
        self.param("sort", SortOrder::Desc)
    }

    pub fn is_published(&self) -> QueryParam<PublishedFilter> {
        self.param("isPublished", PublishedFilter::All)
    }

    pub fn blog_category(&self) -> QueryParam<BlogKind> {
        self.param("category", BlogKind::Press)
    }

    pub fn tab(&self) -> QueryParam<FinanceWindow> {
        self.param("tab", FinanceWindow::TwelveMonths)
    }

    /// Record id being edited or viewed. Read it with [`QueryParam::value`].
    pub fn id(&self) -> QueryParam<ResourceId> {
        self.param("id", 0)
    }

    /// Open/closed flag of a dialog, e.g. `instructorSetup` or `viewMore`.
    pub fn flag(&self, name: &'static str) -> QueryParam<bool> {
        self.param(name, false)
    }

    pub fn instructor_setup(&self) -> QueryParam<bool> {
        self.flag("instructorSetup")
    }

    pub fn add_new_course(&self) -> QueryParam<bool> {
        self.flag("addNewCourse")
    }

    pub fn view_more(&self) -> QueryParam<bool> {
        self.flag("viewMore")
    }

    pub fn filter_open(&self) -> QueryParam<bool> {
        self.flag("filter")
    }
}
