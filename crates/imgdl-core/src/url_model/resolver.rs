//! Collision-free destination names inside the save directory.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::{candidate_name, with_image_extension};

/// Prefix of synthesized names: `application_image_<N>.<ext>`.
pub const FALLBACK_PREFIX: &str = "application_image_";

/// Process-wide source of fallback ids. Ids strictly increase and are never reused.
#[derive(Debug, Default)]
pub struct FallbackCounter {
    next: Mutex<u64>,
}

impl FallbackCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> u64 {
        let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
        let id = *next;
        *next += 1;
        id
    }
}

/// Derives filenames for downloads. Clones share the same counter.
///
/// The existence check is not atomic with the caller's file creation; two
/// workers can pick the same URL-derived name. Callers create files with
/// create-new semantics and resolve again on `AlreadyExists`.
#[derive(Debug, Clone)]
pub struct FilenameResolver {
    save_dir: PathBuf,
    default_extension: String,
    counter: Arc<FallbackCounter>,
}

impl FilenameResolver {
    pub fn new(
        save_dir: impl Into<PathBuf>,
        default_extension: impl Into<String>,
        counter: Arc<FallbackCounter>,
    ) -> Self {
        Self {
            save_dir: save_dir.into(),
            default_extension: default_extension.into(),
            counter,
        }
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Next synthesized name, e.g. `application_image_0.jfif`.
    pub fn fallback_name(&self) -> String {
        format!(
            "{}{}.{}",
            FALLBACK_PREFIX,
            self.counter.next_id(),
            self.default_extension
        )
    }

    /// Filename (relative to the save directory) that does not exist at the time of the call.
    ///
    /// A taken name is never suffixed; a fresh fallback name replaces it.
    pub fn resolve(&self, url: &str) -> String {
        let mut name = match candidate_name(url) {
            Some(candidate) => with_image_extension(&candidate, &self.default_extension),
            None => self.fallback_name(),
        };
        while self.save_dir.join(&name).exists() {
            tracing::debug!(url, taken = %name, "filename exists, synthesizing another");
            name = self.fallback_name();
        }
        name
    }

    pub fn resolve_path(&self, url: &str) -> PathBuf {
        self.save_dir.join(self.resolve(url))
    }
}
