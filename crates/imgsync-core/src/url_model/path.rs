//! Hints taken from the URL itself: eligibility, path extension, `format` query.

/// Returns true if `value` is an absolute HTTP(S) URL this tool will fetch.
pub fn is_eligible_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Extracts the lowercased extension (with leading `.`) of the URL's last path segment.
///
/// Leading dots of the segment do not start an extension, so `/.png` has none.
/// Returns `None` if the URL cannot be parsed or the segment has no extension.
pub fn extension_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().rsplit('/').next()?;
    let name = segment.trim_start_matches('.');
    let dot = name.rfind('.')?;
    Some(name[dot..].to_lowercase())
}

/// Returns the first non-empty `format` query parameter, lowercased.
pub fn format_from_query(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .filter(|(k, _)| k == "format")
        .map(|(_, v)| v.to_lowercase())
        .find(|v| !v.is_empty())
}
