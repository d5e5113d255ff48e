//! Choosing a local file name for a downloaded archive

use reqwest::header::{HeaderMap, CONTENT_DISPOSITION};
use url::Url;

/// Extension appended to URL-derived names that lack one
const ARCHIVE_EXTENSION: &str = "osz";

/// Pick a file name from the response, then the URL, then `default`
#[must_use]
pub fn derive_filename(headers: &HeaderMap, url: Option<&Url>, default: &str) -> String {
    headers
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(filename_from_disposition)
        .or_else(|| url.and_then(filename_from_url))
        .unwrap_or_else(|| default.to_string())
}

/// Extract the file name from a `Content-Disposition` header value
///
/// `filename*=` (RFC 5987) wins over plain `filename=`.
#[must_use]
pub fn filename_from_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for part in split_params(value) {
        let Some((key, raw)) = part.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                // charset'lang'percent-encoded
                let encoded = raw.trim().rsplit('\'').next().unwrap_or(raw);
                extended = urlencoding::decode(encoded.trim_matches('"'))
                    .ok()
                    .map(|s| s.into_owned());
            }
            "filename" => plain = Some(raw.trim().trim_matches('"').to_string()),
            _ => {}
        }
    }

    extended.or(plain).and_then(|name| sanitize(&name))
}

/// Split header parameters on `;`, ignoring separators inside quotes
fn split_params(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                parts.push(value[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(value[start..].trim());
    parts
}

/// Derive a name from the last non-empty URL path segment
#[must_use]
pub fn filename_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.rev().find(|s| !s.is_empty())?;
    let decoded = urlencoding::decode(segment).ok()?;
    let name = sanitize(&decoded)?;
    if std::path::Path::new(&name).extension().is_some() {
        Some(name)
    } else {
        Some(format!("{name}.{ARCHIVE_EXTENSION}"))
    }
}

/// Strip path separators and reserved characters; `None` if nothing is left
fn sanitize(name: &str) -> Option<String> {
    let cleaned: String = name
        .chars()
        .filter(|c| {
            !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') && !c.is_control()
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
