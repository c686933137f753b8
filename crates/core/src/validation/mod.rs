//! Client-side form validation.
//!
//! Form schemas are `validator` derives in [`forms`]; image fields are checked
//! by [`upload`]. Validation failures are collected into [`FormErrors`] and
//! stay with the form: an invalid form never reaches the network.

pub mod forms;
pub mod upload;

use std::collections::BTreeMap;

use validator::{Validate, ValidationErrors};

pub use forms::{
    BlogForm, CourseEditForm, CourseForm, InstructorForm, LoginForm, VideoForm,
    MIN_PASSWORD_LEN,
};
pub use upload::{ImageField, LocalFile, UploadRejected, MAX_IMAGE_BYTES};

/// Inline, per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages for a single field, empty if the field is valid.
    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }
}

impl From<&ValidationErrors> for FormErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut out = FormErrors::default();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                out.insert(&field, message);
            }
        }
        out
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, msgs)| format!("{field}: {}", msgs.join("; ")))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Run a form's schema and collect its messages.
pub fn check<F: Validate>(form: &F) -> Result<(), FormErrors> {
    form.validate().map_err(|e| FormErrors::from(&e))
}
