//! Destination files for downloaded images.
//!
//! Files are created with create-new semantics (never overwriting) and each
//! received chunk is written straight through; the handle is closed when the
//! writer is dropped, whichever way the transfer ends.

mod writer;

pub use writer::{ImageWriter, SavedFile};

use std::io;

use crate::url_model::FilenameResolver;

/// Resolve a name for `url` and create it exclusively.
///
/// If another worker creates the same name between the existence check and
/// the open, the name is resolved again (the taken name now exists, so a
/// fallback name follows).
pub fn create_unique(resolver: &FilenameResolver, url: &str) -> io::Result<ImageWriter> {
    loop {
        let path = resolver.resolve_path(url);
        match ImageWriter::create_new(&path) {
            Ok(w) => return Ok(w),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!(url, path = %path.display(), "lost filename race, resolving again");
            }
            Err(e) => return Err(e),
        }
    }
}
