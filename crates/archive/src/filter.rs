//! Which archive entries count as artwork

use obae_types::ImageFormat;

/// Whether an archive entry should be extracted
///
/// Matching is case-insensitive on the `/`-separated path. Storyboard
/// layers (`sb/`) are skipped unless they sit under a background folder
/// (`bg/`), anything mentioning lyrics is skipped, and only PNG and JPEG
/// files are kept.
#[must_use]
pub fn entry_is_artwork(path: &str) -> bool {
    let normalized = normalize(path);
    if normalized.ends_with('/') {
        return false;
    }
    if normalized.contains("sb/") && !normalized.contains("bg/") {
        return false;
    }
    if normalized.contains("lyric") {
        return false;
    }
    ImageFormat::from_path(&normalized).is_some()
}

/// Lowercase and use `/` separators
pub(crate) fn normalize(path: &str) -> String {
    path.replace('\\', "/").to_lowercase()
}
