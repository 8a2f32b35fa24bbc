//! Filesystem-safe filename cleanup.

/// Linux NAME_MAX in bytes.
const NAME_MAX: usize = 255;

/// Makes a URL segment safe to use as a single filename.
///
/// - Decodes `%XX` escapes (invalid UTF-8 is replaced)
/// - Replaces path separators, NUL and control characters with `_`
/// - Trims surrounding whitespace and leading dots (no hidden files)
/// - Truncates to 255 bytes on a char boundary
pub fn sanitize_filename(segment: &str) -> String {
    let decoded = percent_decode(segment);
    let replaced: String = decoded
        .chars()
        .map(|c| if c == '/' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    let trimmed = replaced.trim().trim_start_matches('.');

    let mut take = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push(h << 4 | l);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
