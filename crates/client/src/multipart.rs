//! `multipart/form-data` bodies for the create/update endpoints.
//!
//! List fields are sent as one part per element under the same name.

use reqwest::multipart::{Form, Part};
use upbreed_core::models::{CoursePatch, NewBlog, NewCourse, NewInstructor};
use upbreed_core::types::ResourceId;
use upbreed_core::validation::upload::LocalFile;

use crate::error::ApiError;

fn file_part(file: &LocalFile) -> Result<Part, ApiError> {
    Ok(Part::bytes(file.bytes.clone())
        .file_name(file.name.clone())
        .mime_str(&file.mime)?)
}

fn with_file(form: Form, name: &'static str, file: Option<&LocalFile>) -> Result<Form, ApiError> {
    match file {
        Some(file) => Ok(form.part(name, file_part(file)?)),
        None => Ok(form),
    }
}

fn with_ids(form: Form, name: &'static str, ids: &[ResourceId]) -> Form {
    ids.iter()
        .fold(form, |form, id| form.text(name, id.to_string()))
}

pub(crate) fn course_form(course: &NewCourse) -> Result<Form, ApiError> {
    let form = Form::new()
        .text("instructor", course.instructor.to_string())
        .text("title", course.title.clone())
        .text("description", course.description.clone())
        .text("isActive", course.is_active.to_string());
    let form = with_ids(form, "categories", &course.categories);
    with_file(form, "image", course.image.as_ref())
}

/// Only the fields present in the patch become parts.
pub(crate) fn course_patch_form(patch: &CoursePatch) -> Result<Form, ApiError> {
    let mut form = Form::new();
    if let Some(title) = &patch.title {
        form = form.text("title", title.clone());
    }
    if let Some(description) = &patch.description {
        form = form.text("description", description.clone());
    }
    if let Some(categories) = &patch.categories {
        form = with_ids(form, "categories", categories);
    }
    with_file(form, "image", patch.image.as_ref())
}

pub(crate) fn instructor_form(instructor: &NewInstructor) -> Result<Form, ApiError> {
    let form = Form::new()
        .text("fname", instructor.fname.clone())
        .text("lname", instructor.lname.clone())
        .text("email", instructor.email.clone())
        .text("about", instructor.about.clone());
    with_file(form, "profilePicture", instructor.profile_picture.as_ref())
}

pub(crate) fn blog_form(blog: &NewBlog) -> Result<Form, ApiError> {
    let form = Form::new()
        .text("title", blog.title.clone())
        .text("description", blog.description.clone())
        .text("content", blog.content.clone())
        .text("isPublished", blog.is_published.to_string())
        .text("type", blog.kind.as_str());
    let form = with_ids(form, "categoryIds", &blog.category_ids);
    with_file(form, "previewImage", blog.preview_image.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_mime_is_rejected_before_sending() {
        let file = LocalFile::with_mime("x.png", "not a mime", vec![1, 2, 3]);
        assert!(file_part(&file).is_err());
    }

    #[test]
    fn builds_forms_for_every_payload() {
        let course = NewCourse {
            instructor: 4,
            title: "Selling".into(),
            description: "A long description".into(),
            image: Some(LocalFile::with_mime("c.png", "image/png", vec![0; 4])),
            is_active: true,
            categories: vec![1],
        };
        assert!(!course_form(&course).unwrap().boundary().is_empty());
        assert!(course_patch_form(&CoursePatch::default()).is_ok());
    }
}
