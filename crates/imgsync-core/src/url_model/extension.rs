//! Image extension inference from URL hints and response content type.

use super::path::{extension_from_url_path, format_from_query};

/// Extensions this tool will assign to a downloaded image.
pub const IMAGE_EXTENSIONS: [&str; 6] = [".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];

/// Extension used when neither the URL nor the content type gives a usable hint.
pub const DEFAULT_EXTENSION: &str = ".png";

/// Returns the whitelisted extension equal to `candidate`, if any.
pub fn whitelisted(candidate: &str) -> Option<&'static str> {
    IMAGE_EXTENSIONS.iter().copied().find(|ext| *ext == candidate)
}

/// Extension derived from the URL alone: path extension first, then `?format=`.
pub fn extension_from_url(url: &str) -> Option<&'static str> {
    if let Some(ext) = extension_from_url_path(url).as_deref().and_then(whitelisted) {
        return Some(ext);
    }
    format_from_query(url).and_then(|fmt| whitelisted(&format!(".{fmt}")))
}

/// Maps a declared content type to an extension by substring match.
///
/// Checks run in a fixed order (`png`, `jpeg`/`jpg`, `gif`, `webp`, `svg`) and
/// are case-sensitive; the first hit wins.
pub fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
    if content_type.contains("png") {
        Some(".png")
    } else if content_type.contains("jpeg") || content_type.contains("jpg") {
        Some(".jpg")
    } else if content_type.contains("gif") {
        Some(".gif")
    } else if content_type.contains("webp") {
        Some(".webp")
    } else if content_type.contains("svg") {
        Some(".svg")
    } else {
        None
    }
}

/// Resolves the most plausible image extension for `url`.
///
/// Order: URL path extension, `format` query parameter, `content_type`
/// substring match, then [`DEFAULT_EXTENSION`]. Never fails and never looks
/// at the downloaded bytes.
pub fn resolve_extension(url: &str, content_type: Option<&str>) -> &'static str {
    extension_from_url(url)
        .or_else(|| content_type.and_then(extension_from_content_type))
        .unwrap_or(DEFAULT_EXTENSION)
}
