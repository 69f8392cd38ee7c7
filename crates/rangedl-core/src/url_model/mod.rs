//! Local filename derivation from a URL.

mod sanitize;

pub use sanitize::sanitize_filename;

/// Fallback when the URL path yields nothing usable.
pub const DEFAULT_FILENAME: &str = "download.bin";

/// Last non-empty path segment of `url` (query and fragment ignored).
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}

/// Derives a safe filename for saving `url`, e.g.
/// `https://example.com/pub/debian-12.iso?x=1` → `debian-12.iso`.
pub fn derive_filename(url: &str) -> String {
    filename_from_url_path(url)
        .map(|raw| sanitize_filename(&raw))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}
