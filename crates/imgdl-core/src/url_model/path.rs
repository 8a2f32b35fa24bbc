//! Final path segment of a URL.

/// Last segment of the URL path after stripping one trailing `/`.
///
/// Query and fragment are not part of the path. URLs the `url` crate cannot
/// parse are split as plain text. Returns `None` for an empty segment.
pub fn last_path_segment(url: &str) -> Option<String> {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => {
            let end = url.find(|c: char| c == '?' || c == '#').unwrap_or(url.len());
            url[..end].to_string()
        }
    };
    let path = path.strip_suffix('/').unwrap_or(&path);
    let segment = path.rsplit('/').next().unwrap_or_default();
    if segment.is_empty() {
        return None;
    }
    Some(segment.to_string())
}
