//! Parse HTTP response header lines into HeadResult.

use super::HeadResult;

/// Status code of an HTTP status line (`HTTP/1.1 200 OK`, `HTTP/2 404`), if `line` is one.
pub(crate) fn status_code(line: &[u8]) -> Option<u32> {
    let line = std::str::from_utf8(line).ok()?;
    let rest = line.strip_prefix("HTTP/")?;
    rest.split_whitespace().nth(1)?.parse().ok()
}

/// Parse collected header lines into HeadResult.
///
/// With redirects curl reports the headers of every hop; only the block after
/// the last status line describes the final resource.
pub(crate) fn parse_headers(status: u32, lines: &[String]) -> HeadResult {
    let mut content_type = None;
    let mut content_length = None;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            content_type = None;
            content_length = None;
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-type") {
                content_type = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    content_length = Some(n);
                }
            }
        }
    }

    HeadResult {
        status,
        content_type,
        content_length,
    }
}
