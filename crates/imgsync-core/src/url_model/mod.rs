//! URL modeling and local filename derivation.
//!
//! Turns a record's topic into a filesystem-safe slug and a remote image
//! URL (plus an optional response content type) into the most plausible
//! image extension.

mod extension;
mod path;
mod sanitize;

pub use extension::{
    extension_from_content_type, extension_from_url, resolve_extension, whitelisted,
    DEFAULT_EXTENSION, IMAGE_EXTENSIONS,
};
pub use path::{extension_from_url_path, format_from_query, is_eligible_url};
pub use sanitize::{slugify, FALLBACK_SLUG};

/// Slug used for a record at `index` (0-based) that has no usable topic.
///
/// Numbering is 1-based so the first untitled record becomes `img-1`.
pub fn positional_slug(index: usize) -> String {
    slugify(&format!("img-{}", index + 1))
}
