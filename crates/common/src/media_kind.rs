//! Media kind classification by file extension.

use serde::{Deserialize, Serialize};

/// Image extensions accepted by the upload allow-list.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "heic"];

/// Video extensions accepted by the upload allow-list.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];

/// Kind of a media item, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image (including HEIC, which is converted to JPEG on upload).
    Image,
    /// Video clip; gets a derived JPEG thumbnail.
    Video,
}

impl MediaKind {
    /// Classify an extension. Returns `None` for extensions outside the
    /// allow-list.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Video)
        } else {
            None
        }
    }

    /// Classify a filename by its extension.
    #[must_use]
    pub fn from_filename(filename: &str) -> Option<Self> {
        extension_of(filename).as_deref().and_then(Self::from_extension)
    }
}

/// Lowercased extension of a filename, if it has one.
#[must_use]
pub fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

/// MIME type for a filename, by extension.
#[must_use]
pub fn mime_type_of(filename: &str) -> &'static str {
    match extension_of(filename).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_extensions() {
        assert_eq!(MediaKind::from_extension("jpg"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_extension("HEIC"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_extension("mkv"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_extension("exe"), None);
    }

    #[test]
    fn test_classify_filenames() {
        assert_eq!(
            MediaKind::from_filename("abc123.MOV"),
            Some(MediaKind::Video)
        );
        assert_eq!(MediaKind::from_filename("noextension"), None);
        assert_eq!(MediaKind::from_filename("trailingdot."), None);
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type_of("a.jpeg"), "image/jpeg");
        assert_eq!(mime_type_of("a.mp4"), "video/mp4");
        assert_eq!(mime_type_of("a.unknown"), "application/octet-stream");
    }
}
