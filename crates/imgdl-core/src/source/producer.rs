//! The parser task: reads the source line by line and enqueues serviceable URLs.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use super::encoding::{decode, DecodeError, SourceEncoding};
use crate::filter::UrlFilter;
use crate::pipeline::PipelineEvent;
use crate::queue::UrlQueue;

/// Counts reported by the producer once the source is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProducerStats {
    pub lines: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// A decoded URL source, ready to be parsed once.
///
/// The file is read and decoded up front so that I/O and encoding errors
/// surface before any worker thread starts.
#[derive(Debug)]
pub struct Producer {
    origin: PathBuf,
    encoding: SourceEncoding,
    text: String,
}

impl Producer {
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("cannot read URL file {}", path.display()))?;
        Self::from_bytes(path, &bytes)
            .with_context(|| format!("cannot decode URL file {}", path.display()))
    }

    /// `origin` only labels log lines.
    pub fn from_bytes(origin: &Path, bytes: &[u8]) -> Result<Self, DecodeError> {
        let (encoding, text) = decode(bytes)?;
        tracing::debug!(source = %origin.display(), ?encoding, "URL source decoded");
        Ok(Self {
            origin: origin.to_path_buf(),
            encoding,
            text,
        })
    }

    pub fn encoding(&self) -> SourceEncoding {
        self.encoding
    }

    /// Candidate URLs, one per line, without line terminators. Blank lines yield `""`.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    /// Filter every line, push accepted URLs (blocking while the queue is full),
    /// then push exactly one terminator.
    ///
    /// Consumes the producer: a source is parsed once.
    pub fn run(
        self,
        queue: &UrlQueue,
        filter: &dyn UrlFilter,
        events: Option<&Sender<PipelineEvent>>,
    ) -> ProducerStats {
        let mut stats = ProducerStats::default();
        for url in self.candidates() {
            stats.lines += 1;
            if filter.accept(url) {
                stats.accepted += 1;
                queue.push_url(url);
                send(events, PipelineEvent::Accepted { url: url.to_string() });
            } else {
                stats.rejected += 1;
                tracing::debug!(url, "skipping URL");
                send(events, PipelineEvent::Rejected { url: url.to_string() });
            }
        }
        queue.push_terminator();
        tracing::info!(
            source = %self.origin.display(),
            lines = stats.lines,
            accepted = stats.accepted,
            "URL source exhausted"
        );
        stats
    }
}

fn send(events: Option<&Sender<PipelineEvent>>, event: PipelineEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}
