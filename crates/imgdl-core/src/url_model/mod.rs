//! URL modeling and filename derivation.
//!
//! Derives a local image filename from the last URL path segment, forces a
//! known image extension, and falls back to counter-based names when the URL
//! yields nothing usable or the name is already taken on disk.

mod extension;
mod path;
mod resolver;
mod sanitize;

pub use extension::{is_image_extension, with_image_extension, IMAGE_EXTENSIONS};
pub use path::last_path_segment;
pub use resolver::{FallbackCounter, FilenameResolver, FALLBACK_PREFIX};
pub use sanitize::sanitize_filename;

/// Candidate base name for `url`, before extension handling and collision checks.
///
/// `None` when the URL has no usable final segment.
pub fn candidate_name(url: &str) -> Option<String> {
    let raw = last_path_segment(url)?;
    let clean = sanitize_filename(&raw);
    if clean.is_empty() || clean == "." || clean == ".." {
        None
    } else {
        Some(clean)
    }
}
