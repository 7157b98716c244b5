//! Video upload validation and stored-file naming.

use crate::error::CoreError;
use crate::types::Timestamp;

/// Maximum length of a video title.
pub const MAX_TITLE_LEN: usize = 255;

/// Accepted video file extensions (lowercase, without the dot).
pub const SUPPORTED_VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "m4v", "mkv", "ogg"];

/// Validate a video title and return it trimmed.
pub fn validate_title(title: &str) -> Result<String, CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("title is required".into()));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "title exceeds maximum length of {MAX_TITLE_LEN}"
        )));
    }
    Ok(trimmed.to_string())
}

/// Normalize an optional description: blank descriptions become `None`.
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Extract and validate the extension of an uploaded file name.
///
/// Returns the lowercase extension.
pub fn validate_video_extension(filename: &str) -> Result<String, CoreError> {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    if SUPPORTED_VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported video format '{filename}'. Supported: {SUPPORTED_VIDEO_EXTENSIONS:?}"
        )))
    }
}

/// Name under which an upload is stored: upload time in milliseconds plus
/// the original extension, e.g. `1718000000000.mp4`.
pub fn stored_filename(uploaded_at: Timestamp, ext: &str) -> String {
    format!("{}.{ext}", uploaded_at.timestamp_millis())
}
