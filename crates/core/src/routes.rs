//! Admin route table.

use std::fmt;

use crate::types::ResourceId;

/// Screens reachable in the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    Dashboard,
    Projects,
    Courses,
    Course(ResourceId),
    Instructors,
    Blogs,
    BlogCreate,
    BlogEdit(ResourceId),
    Finance,
    Sessions,
    Settings,
    Login,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Dashboard => "/".to_string(),
            Self::Projects => "/projects".to_string(),
            Self::Courses => "/courses".to_string(),
            Self::Course(id) => format!("/projects/{id}"),
            Self::Instructors => "/instructors".to_string(),
            Self::Blogs => "/blog".to_string(),
            Self::BlogCreate => "/blog/create".to_string(),
            Self::BlogEdit(id) => format!("/blog/create?id={id}"),
            Self::Finance => "/finance".to_string(),
            Self::Sessions => "/1-1-sessions".to_string(),
            Self::Settings => "/settings".to_string(),
            Self::Login => "/auth/login".to_string(),
        }
    }

    /// Whether the route sits behind the session guard.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Self::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
