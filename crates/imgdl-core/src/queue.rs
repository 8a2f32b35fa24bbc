//! Bounded blocking FIFO between the parser and the downloaders.
//!
//! Shutdown uses a single terminator: whoever pops it pushes it back before
//! exiting, so every worker sees it exactly once and the queue ends holding
//! just the terminator.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Entry carried by the URL queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEntry {
    Url(String),
    Terminate,
}

/// Bounded multi-producer multi-consumer queue with blocking push and pop.
///
/// Neither operation has a timeout; callers rely on the terminator protocol to stop.
#[derive(Debug)]
pub struct UrlQueue {
    entries: Mutex<VecDeque<QueueEntry>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl UrlQueue {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    // A panicking worker must not wedge the others; the deque stays consistent.
    fn lock(&self) -> MutexGuard<'_, VecDeque<QueueEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks while the queue is full.
    pub fn push(&self, entry: QueueEntry) {
        let mut entries = self.lock();
        while entries.len() >= self.capacity {
            entries = self
                .not_full
                .wait(entries)
                .unwrap_or_else(PoisonError::into_inner);
        }
        entries.push_back(entry);
        drop(entries);
        self.not_empty.notify_one();
    }

    /// Blocks while the queue is empty.
    pub fn pop(&self) -> QueueEntry {
        let mut entries = self.lock();
        loop {
            if let Some(entry) = entries.pop_front() {
                drop(entries);
                self.not_full.notify_one();
                return entry;
            }
            entries = self
                .not_empty
                .wait(entries)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn push_url(&self, url: impl Into<String>) {
        self.push(QueueEntry::Url(url.into()));
    }

    pub fn push_terminator(&self) {
        self.push(QueueEntry::Terminate);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Consumer side of the protocol: hand each URL to `handle` until the
    /// terminator arrives, then put the terminator back for the next worker.
    ///
    /// Returns the number of URLs handled.
    pub fn drain_until_terminated<F>(&self, mut handle: F) -> usize
    where
        F: FnMut(String),
    {
        let mut handled = 0;
        loop {
            match self.pop() {
                QueueEntry::Terminate => {
                    self.push(QueueEntry::Terminate);
                    return handled;
                }
                QueueEntry::Url(url) => {
                    handle(url);
                    handled += 1;
                }
            }
        }
    }
}
