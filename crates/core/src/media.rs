//! Upload media classification and limits.

/// Maximum accepted size of a single image upload (25 MiB).
pub const MAX_IMAGE_BYTES: u64 = 25 * 1024 * 1024;

/// Maximum accepted size of a single video upload (500 MiB).
pub const MAX_VIDEO_BYTES: u64 = 500 * 1024 * 1024;

/// Maximum length of a guest-supplied uploader name.
pub const MAX_UPLOADER_NAME_LENGTH: usize = 80;

/// Media kind names as stored in `photos.media_kind`.
pub mod kinds {
    pub const IMAGE: &str = "IMAGE";
    pub const VIDEO: &str = "VIDEO";
}

/// Accepted image MIME types with their canonical file extension.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/heic", "heic"),
    ("image/heif", "heif"),
    ("image/gif", "gif"),
];

/// Accepted video MIME types with their canonical file extension.
const VIDEO_TYPES: &[(&str, &str)] = &[
    ("video/mp4", "mp4"),
    ("video/quicktime", "mov"),
    ("video/webm", "webm"),
];

/// Result of classifying an upload by MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaType {
    pub kind: &'static str,
    pub extension: &'static str,
    pub max_bytes: u64,
}

/// Classify a MIME type. Parameters such as `; charset=` are ignored.
pub fn classify_mime(mime: &str) -> Option<MediaType> {
    let essence = mime
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if let Some((_, ext)) = IMAGE_TYPES.iter().find(|(m, _)| *m == essence) {
        return Some(MediaType {
            kind: kinds::IMAGE,
            extension: *ext,
            max_bytes: MAX_IMAGE_BYTES,
        });
    }
    VIDEO_TYPES
        .iter()
        .find(|(m, _)| *m == essence)
        .map(|(_, ext)| MediaType {
            kind: kinds::VIDEO,
            extension: *ext,
            max_bytes: MAX_VIDEO_BYTES,
        })
}

/// Guess a MIME type from a filename when the client sent
/// `application/octet-stream`.
pub fn mime_from_filename(filename: &str) -> Option<&'static str> {
    let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
    let ext = match ext.as_str() {
        "jpeg" => "jpg",
        "qt" => "mov",
        other => other,
    };
    IMAGE_TYPES
        .iter()
        .chain(VIDEO_TYPES.iter())
        .find(|(_, e)| *e == ext)
        .map(|(m, _)| *m)
}

/// Check an upload's size against the limit for its media type.
pub fn validate_size(media: &MediaType, size: u64) -> Result<(), String> {
    if size == 0 {
        return Err("Uploaded file is empty".to_string());
    }
    if size > media.max_bytes {
        return Err(format!(
            "File of {size} bytes exceeds the {} MiB limit for {} uploads",
            media.max_bytes / (1024 * 1024),
            media.kind.to_ascii_lowercase()
        ));
    }
    Ok(())
}

/// Normalise a guest-supplied uploader name: trimmed, capped, empty → `None`.
pub fn normalize_uploader_name(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_UPLOADER_NAME_LENGTH).collect())
}
