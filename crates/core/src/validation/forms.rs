//! Form schemas for the admin screens.

use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::models::BlogKind;
use crate::types::ResourceId;
use crate::validation::upload::{check_image, ImageField};

/// Minimum password length accepted by the login form.
pub const MIN_PASSWORD_LEN: u64 = 6;

/// Image fields accept nothing, an existing URL, or an accepted local image.
fn valid_image(field: &ImageField) -> Result<(), ValidationError> {
    let ok = match field {
        ImageField::Empty => true,
        ImageField::Remote(url) => url.starts_with("http://") || url.starts_with("https://"),
        ImageField::Local(file) => check_image(file).is_ok(),
    };
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("image")
            .with_message("Please upload an image file not more than 10MB.".into()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InstructorForm {
    #[validate(length(min = 2, message = "First Name must be at least 2 characters."))]
    pub first_name: String,
    #[validate(length(min = 2, message = "Last Name must be at least 2 characters."))]
    pub last_name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 10, message = "About Instructor must be at least 10 characters."))]
    pub about: String,
    #[validate(custom(function = "valid_image"))]
    pub image: ImageField,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CourseForm {
    #[validate(range(min = 1, message = "Please select an instructor."))]
    pub instructor: ResourceId,
    #[validate(length(min = 2, message = "Course Title must be at least 2 characters."))]
    pub title: String,
    #[validate(length(min = 10, message = "Course Description must be at least 10 characters."))]
    pub description: String,
    #[validate(length(equal = 1, message = "You must select exactly one item."))]
    pub categories: Vec<ResourceId>,
    #[validate(custom(function = "valid_image"))]
    pub image: ImageField,
    pub is_active: bool,
}

/// Edit form for an existing course; field names match `CoursePatch`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
pub struct CourseEditForm {
    #[validate(length(min = 2, message = "Course Title must be at least 2 characters."))]
    pub title: String,
    #[validate(length(min = 10, message = "Course Description must be at least 10 characters."))]
    pub description: String,
    #[validate(length(min = 1, message = "Select at least one category."))]
    pub categories: Vec<ResourceId>,
    #[validate(custom(function = "valid_image"))]
    pub image: ImageField,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BlogForm {
    #[validate(length(min = 2, message = "Title must be at least 2 characters."))]
    pub title: String,
    #[validate(length(min = 10, message = "Description must be at least 10 characters."))]
    pub description: String,
    #[validate(length(min = 1, message = "Content is required."))]
    pub content: String,
    pub kind: BlogKind,
    pub is_published: bool,
    #[validate(length(min = 1, message = "Select at least one category."))]
    pub category_ids: Vec<ResourceId>,
    #[validate(custom(function = "valid_image"))]
    pub preview_image: ImageField,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VideoForm {
    #[validate(length(min = 2, message = "Title must be at least 2 characters."))]
    pub title: String,
    pub description: String,
    #[validate(length(min = 1, message = "Video ID is required."))]
    pub bunny_video_id: String,
    pub is_trailer: bool,
    pub is_public: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{check, LocalFile};

    #[test]
    fn short_password_is_a_field_error() {
        let form = LoginForm {
            email: "user@site.com".into(),
            password: "short".into(),
        };
        let errors = check(&form).unwrap_err();
        assert!(errors.has("password"));
        assert!(!errors.has("email"));
        assert_eq!(
            errors.messages("password"),
            ["Password must be at least 6 characters."]
        );
    }

    #[test]
    fn bad_email_is_a_field_error() {
        let form = LoginForm {
            email: "not-an-email".into(),
            password: "long enough".into(),
        };
        let errors = check(&form).unwrap_err();
        assert_eq!(errors.messages("email"), ["Please enter a valid email address."]);
    }

    #[test]
    fn valid_login_passes() {
        let form = LoginForm {
            email: "user@site.com".into(),
            password: "secret-pass".into(),
        };
        assert!(check(&form).is_ok());
    }

    #[test]
    fn course_requires_exactly_one_category() {
        let form = CourseForm {
            instructor: 4,
            title: "Selling Anything".into(),
            description: "A course about selling anything.".into(),
            categories: vec![1, 2],
            ..Default::default()
        };
        let errors = check(&form).unwrap_err();
        assert_eq!(errors.messages("categories"), ["You must select exactly one item."]);
    }

    #[test]
    fn course_without_instructor_fails() {
        let form = CourseForm {
            title: "Selling Anything".into(),
            description: "A course about selling anything.".into(),
            categories: vec![1],
            ..Default::default()
        };
        assert!(check(&form).unwrap_err().has("instructor"));
    }

    #[test]
    fn instructor_image_must_be_an_image() {
        let form = InstructorForm {
            first_name: "Ross".into(),
            last_name: "Geller".into(),
            email: "ross@site.com".into(),
            about: "Paleontologist and lecturer.".into(),
            image: ImageField::Local(LocalFile::with_mime("cv.pdf", "application/pdf", vec![0])),
        };
        assert!(check(&form).unwrap_err().has("image"));
    }

    #[test]
    fn remote_image_url_is_accepted() {
        let form = InstructorForm {
            first_name: "Ross".into(),
            last_name: "Geller".into(),
            email: "ross@site.com".into(),
            about: "Paleontologist and lecturer.".into(),
            image: ImageField::Remote("https://cdn.example/ross.png".into()),
        };
        assert!(check(&form).is_ok());
    }
}
