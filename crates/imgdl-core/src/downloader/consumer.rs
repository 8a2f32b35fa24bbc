//! Downloader worker loop.

use serde::Serialize;
use std::sync::mpsc::Sender;

use super::Downloader;
use crate::pipeline::PipelineEvent;
use crate::queue::UrlQueue;
use crate::storage::SavedFile;

/// What one worker did before it saw the terminator.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConsumerStats {
    pub worker: usize,
    pub saved: Vec<SavedFile>,
    pub abandoned: usize,
}

/// Drain `queue` until the terminator arrives, downloading every URL.
///
/// Per-URL failures are logged and counted; they never stop the worker.
pub fn run_consumer(
    worker: usize,
    queue: &UrlQueue,
    downloader: &Downloader,
    events: Option<&Sender<PipelineEvent>>,
) -> ConsumerStats {
    let mut stats = ConsumerStats {
        worker,
        ..ConsumerStats::default()
    };
    tracing::debug!(worker, "downloader started");
    queue.drain_until_terminated(|url| match downloader.download(&url) {
        Ok(saved) => {
            if let Some(tx) = events {
                let _ = tx.send(PipelineEvent::Saved {
                    worker,
                    file: saved.clone(),
                });
            }
            stats.saved.push(saved);
        }
        Err(e) => {
            stats.abandoned += 1;
            if let Some(tx) = events {
                let _ = tx.send(PipelineEvent::Abandoned {
                    worker,
                    url,
                    reason: e.to_string(),
                });
            }
        }
    });
    tracing::debug!(worker, saved = stats.saved.len(), abandoned = stats.abandoned, "downloader terminated");
    stats
}
