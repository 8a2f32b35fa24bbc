//! Sequential writer for one downloaded image.

use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A file written by a completed download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedFile {
    pub url: String,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Open destination file. Dropping it closes the handle.
#[derive(Debug)]
pub struct ImageWriter {
    file: File,
    path: PathBuf,
    written: u64,
}

impl ImageWriter {
    /// Fails with `AlreadyExists` if `path` is present.
    pub fn create_new(path: &Path) -> io::Result<Self> {
        let file = File::options().write(true).create_new(true).open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Write one received chunk as-is.
    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Flush and close the file.
    pub fn finish(mut self, url: &str) -> io::Result<SavedFile> {
        self.file.flush()?;
        Ok(SavedFile {
            url: url.to_string(),
            path: self.path,
            bytes: self.written,
        })
    }
}
