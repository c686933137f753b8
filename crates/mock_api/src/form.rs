//! Parsed `multipart/form-data` bodies.

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::error::{MockError, MockResult};

/// Metadata of an uploaded file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: usize,
}

/// Text fields (repeatable) and file parts of a multipart body.
#[derive(Debug, Default)]
pub struct FormFields {
    texts: HashMap<String, Vec<String>>,
    files: HashMap<String, UploadedFile>,
}

impl FormFields {
    pub async fn read(mut multipart: Multipart) -> MockResult<Self> {
        let mut fields = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    fields.files.insert(
                        name,
                        UploadedFile {
                            file_name,
                            content_type,
                            size: bytes.len(),
                        },
                    );
                }
                None => {
                    let text = field.text().await?;
                    fields.texts.entry(name).or_default().push(text);
                }
            }
        }
        Ok(fields)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name)?.first().map(String::as_str)
    }

    pub fn required(&self, name: &str) -> MockResult<String> {
        self.text(name)
            .map(str::to_string)
            .ok_or_else(|| MockError::BadRequest(format!("missing field `{name}`")))
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.text(name).map(|v| v == "true")
    }

    /// All values of a repeated numeric field.
    pub fn ids(&self, name: &str) -> MockResult<Option<Vec<i64>>> {
        let Some(values) = self.texts.get(name) else {
            return Ok(None);
        };
        values
            .iter()
            .map(|v| {
                v.parse()
                    .map_err(|_| MockError::BadRequest(format!("`{name}` must be numeric")))
            })
            .collect::<MockResult<Vec<_>>>()
            .map(Some)
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }
}
