//! Image upload checks shared by the drag-drop zone and the file picker.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Largest accepted image upload (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const FALLBACK_MIME: &str = "application/octet-stream";

/// A file picked from the local machine.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    /// Build a file, sniffing its MIME type from the content header.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let mime = image::guess_format(&bytes)
            .map(|format| format.to_mime_type().to_string())
            .unwrap_or_else(|_| FALLBACK_MIME.to_string());
        Self {
            name: name.into(),
            mime,
            bytes,
        }
    }

    /// Build a file with a MIME type reported by the picker.
    pub fn with_mime(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Why a picked file was not taken into the field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejected {
    #[error("{name} is not an image ({mime})")]
    NotAnImage { name: String, mime: String },

    #[error("{name} is {size} bytes, the limit is {max}")]
    TooLarge { name: String, size: usize, max: usize },
}

/// Check a file against the image field rules.
pub fn check_image(file: &LocalFile) -> Result<(), UploadRejected> {
    if !file.is_image() {
        return Err(UploadRejected::NotAnImage {
            name: file.name.clone(),
            mime: file.mime.clone(),
        });
    }
    if file.size() > MAX_IMAGE_BYTES {
        return Err(UploadRejected::TooLarge {
            name: file.name.clone(),
            size: file.size(),
            max: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

/// Value of an image form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageField {
    #[default]
    Empty,
    /// An image already stored server-side (edit forms).
    Remote(String),
    /// A newly picked file waiting to be uploaded.
    Local(LocalFile),
}

impl ImageField {
    /// Take a dropped or picked file.
    ///
    /// A rejected file leaves the current value untouched.
    pub fn accept(&mut self, file: LocalFile) -> Result<(), UploadRejected> {
        check_image(&file)?;
        *self = Self::Local(file);
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::Empty;
    }

    /// The file to upload, if a new one was picked.
    pub fn local_file(&self) -> Option<&LocalFile> {
        match self {
            Self::Local(file) => Some(file),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl Serialize for ImageField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_none(),
            Self::Remote(url) => serializer.serialize_str(url),
            Self::Local(file) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("name", &file.name)?;
                map.serialize_entry("mime", &file.mime)?;
                map.serialize_entry("size", &file.size())?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn sniffs_png() {
        let file = LocalFile::from_bytes("a.png", PNG_HEADER.to_vec());
        assert_eq!(file.mime, "image/png");
        assert!(file.is_image());
    }

    #[test]
    fn unknown_content_is_octet_stream() {
        let file = LocalFile::from_bytes("notes.txt", b"hello world".to_vec());
        assert_eq!(file.mime, "application/octet-stream");
    }

    #[test]
    fn rejected_file_leaves_value_unchanged() {
        let mut field = ImageField::Remote("https://cdn.example/a.png".into());
        let pdf = LocalFile::with_mime("doc.pdf", "application/pdf", vec![1, 2, 3]);

        let err = field.accept(pdf).unwrap_err();
        assert!(matches!(err, UploadRejected::NotAnImage { .. }));
        assert_eq!(field, ImageField::Remote("https://cdn.example/a.png".into()));
    }

    #[test]
    fn oversized_image_is_rejected() {
        let mut field = ImageField::Empty;
        let big = LocalFile::with_mime("big.png", "image/png", vec![0; MAX_IMAGE_BYTES + 1]);
        assert!(matches!(
            field.accept(big),
            Err(UploadRejected::TooLarge { .. })
        ));
        assert!(field.is_empty());
    }

    #[test]
    fn accepted_image_replaces_value() {
        let mut field = ImageField::Empty;
        field
            .accept(LocalFile::from_bytes("a.png", PNG_HEADER.to_vec()))
            .unwrap();
        assert_eq!(field.local_file().map(|f| f.name.as_str()), Some("a.png"));
    }

    #[test]
    fn serializes_for_change_detection() {
        assert_eq!(serde_json::to_value(ImageField::Empty).unwrap(), serde_json::Value::Null);
        assert_eq!(
            serde_json::to_value(ImageField::Remote("u".into())).unwrap(),
            serde_json::json!("u")
        );
    }
}
