//! Progress notifications and the end-of-run report.

use serde::Serialize;
use std::path::PathBuf;

use crate::source::ProducerStats;
use crate::storage::SavedFile;

/// Sent as the run progresses; receivers may lag or disappear without
/// affecting the pipeline.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Accepted { url: String },
    Rejected { url: String },
    Saved { worker: usize, file: SavedFile },
    Abandoned { worker: usize, url: String, reason: String },
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub save_dir: PathBuf,
    pub workers: usize,
    pub lines: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub saved: Vec<SavedFile>,
    pub abandoned: usize,
    /// Entries left in the queue after every worker stopped; 1 (the terminator) on a clean run.
    pub queue_remaining: usize,
}

impl RunReport {
    pub(super) fn new(save_dir: PathBuf, workers: usize, producer: ProducerStats) -> Self {
        Self {
            save_dir,
            workers,
            lines: producer.lines,
            accepted: producer.accepted,
            rejected: producer.rejected,
            saved: Vec::new(),
            abandoned: 0,
            queue_remaining: 0,
        }
    }

    pub fn saved_bytes(&self) -> u64 {
        self.saved.iter().map(|f| f.bytes).sum()
    }
}
