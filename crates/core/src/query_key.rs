//! Cache keys for server data.
//!
//! A [`QueryKey`] is a `(resource, params)` tuple. Keys compare and hash
//! structurally: two keys built from equal tuples address the same cache
//! entry no matter how (or in which order) their params were inserted.
//! A [`KeyFilter`] selects a family of keys for invalidation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resource families addressable in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Courses,
    Course,
    Videos,
    Instructors,
    Instructor,
    Categories,
    Blogs,
    Blog,
    DashboardData,
    Transactions,
}

impl Resource {
    /// Family name used in logs and invalidation events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Courses => "courses",
            Self::Course => "course",
            Self::Videos => "videos",
            Self::Instructors => "instructors",
            Self::Instructor => "instructor",
            Self::Categories => "categories",
            Self::Blogs => "blogs",
            Self::Blog => "blog",
            Self::DashboardData => "dashboardData",
            Self::Transactions => "transactions",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a cached result set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey {
    pub resource: Resource,
    pub params: BTreeMap<String, ParamValue>,
}

/// A single key parameter.
///
/// Wraps a JSON scalar so keys can be hashed; floats are not allowed in keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<ParamValue> for Value {
    fn from(v: ParamValue) -> Self {
        match v {
            ParamValue::Bool(b) => Value::Bool(b),
            ParamValue::Int(i) => Value::from(i),
            ParamValue::Text(s) => Value::String(s),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl QueryKey {
    /// A key with no params.
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            params: BTreeMap::new(),
        }
    }

    /// Add a param. `None` values are omitted so `{page: undefined}` and `{}`
    /// stay the same key.
    pub fn with<V: Into<ParamValue>>(mut self, name: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.params.insert(name.to_string(), value.into());
        }
        self
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Whether this key belongs to the family selected by `filter`.
    pub fn matches(&self, filter: &KeyFilter) -> bool {
        if self.resource != filter.resource {
            return false;
        }
        match &filter.params {
            None => true,
            Some(wanted) => wanted
                .iter()
                .all(|(name, value)| self.params.get(name) == Some(value)),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource)?;
        if !self.params.is_empty() {
            let parts: Vec<String> = self
                .params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            write!(f, "{{{}}}", parts.join(","))?;
        }
        Ok(())
    }
}

/// Partial key used to address a family of cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFilter {
    pub resource: Resource,
    pub params: Option<BTreeMap<String, ParamValue>>,
}

impl KeyFilter {
    /// Match every key of `resource` regardless of params.
    pub fn family(resource: Resource) -> Self {
        Self {
            resource,
            params: None,
        }
    }

    /// Match only keys whose params contain every param of `key`.
    pub fn exact(key: &QueryKey) -> Self {
        Self {
            resource: key.resource,
            params: Some(key.params.clone()),
        }
    }
}

impl From<Resource> for KeyFilter {
    fn from(resource: Resource) -> Self {
        Self::family(resource)
    }
}

impl fmt::Display for KeyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.params {
            None => write!(f, "{}/*", self.resource),
            Some(params) => write!(
                f,
                "{}",
                QueryKey {
                    resource: self.resource,
                    params: params.clone(),
                }
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn courses(page: u32, limit: u32) -> QueryKey {
        QueryKey::new(Resource::Courses)
            .with("page", Some(page))
            .with("limit", Some(limit))
    }

    #[test]
    fn keys_compare_structurally() {
        let a = courses(1, 9);
        let b = QueryKey::new(Resource::Courses)
            .with("limit", Some(9u32))
            .with("page", Some(1u32));
        assert_eq!(a, b);

        let set: HashSet<QueryKey> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn none_params_are_omitted() {
        let key = QueryKey::new(Resource::Instructors)
            .with("page", Some(1u32))
            .with::<&str>("search", None);
        assert!(key.param("search").is_none());
        assert_eq!(key, QueryKey::new(Resource::Instructors).with("page", Some(1u32)));
    }

    #[test]
    fn family_filter_ignores_params() {
        let filter = KeyFilter::family(Resource::Courses);
        assert!(courses(1, 9).matches(&filter));
        assert!(courses(4, 20).matches(&filter));
        assert!(!QueryKey::new(Resource::Course).matches(&filter));
    }

    #[test]
    fn partial_params_filter() {
        let mut params = BTreeMap::new();
        params.insert("page".to_string(), ParamValue::Int(2));
        let filter = KeyFilter {
            resource: Resource::Courses,
            params: Some(params),
        };
        assert!(courses(2, 9).matches(&filter));
        assert!(!courses(1, 9).matches(&filter));
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(courses(2, 9).to_string(), "courses{limit=9,page=2}");
        assert_eq!(KeyFilter::family(Resource::Blogs).to_string(), "blogs/*");
    }
}
