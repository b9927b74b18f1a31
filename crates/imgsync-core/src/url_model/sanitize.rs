//! Slug derivation for local filenames.

/// Slug returned when the input contains no ASCII letters or digits.
pub const FALLBACK_SLUG: &str = "img";

/// Converts arbitrary text into a lowercase, hyphen-separated slug.
///
/// - Lowercases and trims the input
/// - Replaces every run of characters outside `[a-z0-9]` with a single `-`
/// - Never starts or ends with `-`
/// - Returns [`FALLBACK_SLUG`] instead of an empty string
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;

    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            out.push(c);
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }

    if out.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        out
    }
}
