use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::category::Category;
use crate::pagination::PageRequest;
use crate::types::{ResourceId, Timestamp};
use crate::validation::upload::LocalFile;

/// Blog post section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogKind {
    News,
    #[default]
    Press,
}

impl BlogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Press => "press",
        }
    }
}

impl fmt::Display for BlogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlogKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "news" => Ok(Self::News),
            "press" => Ok(Self::Press),
            other => Err(CoreError::InvalidInput(format!("unknown blog kind: {other}"))),
        }
    }
}

/// A blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: ResourceId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub preview_image: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_published: bool,
    #[serde(rename = "type")]
    pub kind: BlogKind,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub categories: Vec<BlogCategoryLink>,
}

impl Blog {
    pub fn category_ids(&self) -> Vec<ResourceId> {
        self.categories.iter().map(|link| link.category.id).collect()
    }
}

/// Join row between a blog post and a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogCategoryLink {
    pub id: ResourceId,
    pub category: Category,
}

/// Multipart payload for `POST /blog` and `PATCH /blog/:id`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBlog {
    pub title: String,
    pub description: String,
    pub content: String,
    pub is_published: bool,
    pub kind: BlogKind,
    pub category_ids: Vec<ResourceId>,
    pub preview_image: Option<LocalFile>,
}

/// Publication filter on the blog list (`ALL`, `DRAFTS`, `PUBLISHED`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PublishedFilter {
    #[default]
    All,
    Drafts,
    Published,
}

impl PublishedFilter {
    /// Value of the `isPublished` query param, if any.
    pub fn as_param(&self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Drafts => Some(false),
            Self::Published => Some(true),
        }
    }
}

impl fmt::Display for PublishedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Drafts => f.write_str("false"),
            Self::Published => f.write_str("true"),
        }
    }
}

impl FromStr for PublishedFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" | "" => Ok(Self::All),
            "false" => Ok(Self::Drafts),
            "true" => Ok(Self::Published),
            other => Err(CoreError::InvalidInput(format!(
                "unknown publish filter: {other}"
            ))),
        }
    }
}

/// Parameters of `GET /blog`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogFilter {
    pub kind: BlogKind,
    pub published: PublishedFilter,
    pub category_id: Option<ResourceId>,
    pub search: Option<String>,
    pub page: PageRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blog_kind_uses_type_field() {
        let json = serde_json::json!({
            "id": 1,
            "title": "Launch",
            "type": "news",
            "categories": [{ "id": 9, "category": { "id": 4, "name": "Design" } }]
        });
        let blog: Blog = serde_json::from_value(json).unwrap();
        assert_eq!(blog.kind, BlogKind::News);
        assert_eq!(blog.category_ids(), vec![4]);
        assert!(!blog.is_published);
    }

    #[test]
    fn published_filter_round_trips_through_strings() {
        for filter in [
            PublishedFilter::All,
            PublishedFilter::Drafts,
            PublishedFilter::Published,
        ] {
            assert_eq!(filter.to_string().parse::<PublishedFilter>().unwrap(), filter);
        }
        assert_eq!(PublishedFilter::Drafts.as_param(), Some(false));
        assert!("maybe".parse::<PublishedFilter>().is_err());
    }
}
