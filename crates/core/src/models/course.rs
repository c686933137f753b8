use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::category::Category;
use crate::types::ResourceId;
use crate::validation::upload::LocalFile;

/// A course as returned by the list and detail endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: ResourceId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub instructor: CourseInstructor,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub preview: Option<CoursePreview>,
    #[serde(default)]
    pub videos: Vec<Video>,
}

fn default_active() -> bool {
    true
}

impl Course {
    pub fn category_ids(&self) -> Vec<ResourceId> {
        self.categories.iter().map(|c| c.id).collect()
    }
}

/// The instructor summary embedded in a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInstructor {
    #[serde(default)]
    pub id: Option<ResourceId>,
    pub fname: String,
    pub lname: String,
}

impl CourseInstructor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.fname, self.lname)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePreview {
    pub lesson_count: u32,
    pub duration_in_minutes: u32,
}

/// A lesson video hosted on Bunny.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: ResourceId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub bunny_video_id: String,
    #[serde(default)]
    pub is_trailer: bool,
    #[serde(default)]
    pub is_public: bool,
}

/// A video entry in the ordered list sent to `PATCH /course/:id/videos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInput {
    pub title: String,
    pub description: String,
    pub bunny_video_id: String,
    pub is_trailer: bool,
    pub is_public: bool,
}

impl From<Video> for VideoInput {
    fn from(v: Video) -> Self {
        Self {
            title: v.title,
            description: v.description,
            bunny_video_id: v.bunny_video_id,
            is_trailer: v.is_trailer,
            is_public: v.is_public,
        }
    }
}

/// Multipart payload for `POST /course`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    pub instructor: ResourceId,
    pub title: String,
    pub description: String,
    pub image: Option<LocalFile>,
    pub is_active: bool,
    pub categories: Vec<ResourceId>,
}

/// Body of `PATCH /course/:id`. Only fields that changed are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<ResourceId>>,
    /// A replacement cover image; sent as a multipart part.
    #[serde(skip)]
    pub image: Option<LocalFile>,
}

impl CoursePatch {
    /// Build a patch from a map of changed form fields.
    ///
    /// Unknown fields are ignored.
    pub fn from_changes(changes: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        let mut patch = Self::default();
        if let Some(v) = changes.get("title") {
            patch.title = Some(serde_json::from_value(v.clone())?);
        }
        if let Some(v) = changes.get("description") {
            patch.description = Some(serde_json::from_value(v.clone())?);
        }
        if let Some(v) = changes.get("categories") {
            patch.categories = Some(serde_json::from_value(v.clone())?);
        }
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.categories.is_none()
            && self.image.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_deserializes_from_wire_shape() {
        let json = serde_json::json!({
            "id": 3,
            "title": "Selling Anything",
            "thumbnail": null,
            "instructor": { "fname": "Ross", "lname": "Geller" },
            "categories": [{ "id": 1, "name": "Music" }],
            "preview": { "lessonCount": 10, "durationInMinutes": 90 },
            "videos": []
        });
        let course: Course = serde_json::from_value(json).unwrap();
        assert_eq!(course.instructor.full_name(), "Ross Geller");
        assert_eq!(course.category_ids(), vec![1]);
        assert!(course.is_active);
        assert_eq!(course.preview.unwrap().lesson_count, 10);
    }

    #[test]
    fn patch_omits_unchanged_fields() {
        let mut changes = Map::new();
        changes.insert("title".into(), Value::from("New title"));
        let patch = CoursePatch::from_changes(&changes).unwrap();

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "New title" }));
        assert!(!patch.is_empty());
    }

    #[test]
    fn empty_changes_give_empty_patch() {
        let patch = CoursePatch::from_changes(&Map::new()).unwrap();
        assert!(patch.is_empty());
    }
}
