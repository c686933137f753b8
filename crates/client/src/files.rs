//! Loading local files picked for upload.

use std::path::Path;

use upbreed_core::validation::upload::LocalFile;

use crate::error::ApiError;

/// Read a file from disk into a [`LocalFile`], sniffing its MIME type.
///
/// The file name part of `path` becomes the upload's file name.
pub async fn read_local_file(path: impl AsRef<Path>) -> Result<LocalFile, ApiError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File {
        path: path.display().to_string(),
        source,
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    tracing::debug!(file = %name, size = bytes.len(), "Loaded local file");
    Ok(LocalFile::from_bytes(name, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[tokio::test]
    async fn reads_and_sniffs_png() {
        let dir = std::env::temp_dir().join(format!("upbreed-files-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("cover.png");
        tokio::fs::write(&path, PNG_HEADER).await.unwrap();

        let file = read_local_file(&path).await.unwrap();
        assert_eq!(file.name, "cover.png");
        assert_eq!(file.mime, "image/png");
        assert!(file.is_image());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn missing_file_is_a_file_error() {
        let err = read_local_file("/definitely/not/here.png").await.unwrap_err();
        assert!(matches!(err, ApiError::File { .. }));
    }
}
