//! Server-shaped records and write payloads.
//!
//! Field names follow the API's camelCase wire format. The client never holds
//! authoritative copies of these; they live only as long as a cache entry.

pub mod auth;
pub mod blog;
pub mod category;
pub mod course;
pub mod dashboard;
pub mod finance;
pub mod instructor;

use serde::{Deserialize, Serialize};

pub use auth::{LoginRequest, LoginResponse, TokenClaims};
pub use blog::{Blog, BlogCategoryLink, BlogFilter, BlogKind, NewBlog, PublishedFilter};
pub use category::Category;
pub use course::{
    Course, CourseInstructor, CoursePatch, CoursePreview, NewCourse, Video,
    VideoInput,
};
pub use dashboard::{DashboardData, RevenueMonth, SubscriberMonth};
pub use finance::Transaction;
pub use instructor::{Instructor, InstructorDetails, InstructorProfile, NewInstructor};

/// `{ data: T }` single-record envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}
