//! Binary payloads attached to write requests.

use std::path::Path;

use crate::error::{ApiError, ApiResult};

/// Media content plus the metadata the server needs to store it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    pub content: Vec<u8>,
    pub content_type: String,
    /// Filename proposed to the server (sent as `Slug`).
    pub filename: String,
}

impl MediaSource {
    pub fn from_bytes(
        content: impl Into<Vec<u8>>,
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            content_type: content_type.into(),
            filename: filename.into(),
        }
    }

    /// Read a local file; the content type is guessed from its extension.
    pub fn from_path(local_path: impl AsRef<Path>, filename: impl Into<String>) -> ApiResult<Self> {
        let local_path = local_path.as_ref();
        let content = std::fs::read(local_path)
            .map_err(|e| ApiError::Media(format!("{}: {e}", local_path.display())))?;
        let content_type = mime_guess::from_path(local_path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            content,
            content_type,
            filename: filename.into(),
        })
    }

    pub fn content_length(&self) -> usize {
        self.content.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_path_guesses_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"0123456789").unwrap();

        let media = MediaSource::from_path(&path, "holiday.mp4").unwrap();
        assert_eq!(media.content_type, "video/mp4");
        assert_eq!(media.content_length(), 10);
        assert_eq!(media.filename, "holiday.mp4");
    }

    #[test]
    fn unknown_extension_falls_back_to_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.zzqx");
        std::fs::write(&path, b"x").unwrap();

        let media = MediaSource::from_path(&path, "blob").unwrap();
        assert_eq!(media.content_type, "application/octet-stream");
    }

    #[test]
    fn missing_file_is_a_media_error() {
        let err = MediaSource::from_path("/definitely/not/here.mp4", "x.mp4").unwrap_err();
        assert!(matches!(err, ApiError::Media(_)));
    }
}
