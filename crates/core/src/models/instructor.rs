use serde::{Deserialize, Serialize};

use crate::types::{ResourceId, Timestamp};
use crate::validation::upload::LocalFile;

/// An instructor row in the instructor list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: ResourceId,
    pub fname: String,
    pub lname: String,
    pub email: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl Instructor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.fname, self.lname)
    }
}

/// `GET /instructor/:id` detail record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorDetails {
    pub id: ResourceId,
    pub fname: String,
    pub lname: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub email: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub deleted_at: Option<Timestamp>,
    pub instructor_profile: InstructorProfile,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorProfile {
    #[serde(default)]
    pub id: Option<ResourceId>,
    #[serde(default)]
    pub linked_in_url: Option<String>,
    pub about: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub expertise: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Multipart payload for `POST /instructor` and `PATCH /instructor/:id`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInstructor {
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub about: String,
    pub profile_picture: Option<LocalFile>,
}
