//! The producer/consumer run: one parser thread feeding a fixed pool of
//! downloader threads through the bounded URL queue.

mod event;

pub use event::{PipelineEvent, RunReport};

use anyhow::{anyhow, Result};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use crate::config::Settings;
use crate::downloader::{run_consumer, ConsumerStats, Downloader};
use crate::filter::{ServiceabilityFilter, UrlFilter};
use crate::queue::UrlQueue;
use crate::retry::RetryPolicy;
use crate::source::Producer;
use crate::transport::HttpOptions;
use crate::url_model::FallbackCounter;

/// Pushes a terminator if the producer thread unwinds, so workers still stop.
struct TerminateOnPanic<'a>(&'a UrlQueue);

impl Drop for TerminateOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.push_terminator();
        }
    }
}

pub struct Pipeline<F> {
    settings: Settings,
    filter: F,
    counter: Arc<FallbackCounter>,
    events: Option<Sender<PipelineEvent>>,
}

impl Pipeline<ServiceabilityFilter> {
    /// Pipeline that HEAD-probes every candidate with the configured timeout and retry budget.
    pub fn from_settings(settings: Settings) -> Self {
        let filter = ServiceabilityFilter::new(
            HttpOptions::from_settings(&settings),
            RetryPolicy::new(settings.max_reattempts),
        );
        Self::with_filter(settings, filter)
    }
}

impl<F: UrlFilter> Pipeline<F> {
    pub fn with_filter(settings: Settings, filter: F) -> Self {
        Self {
            settings,
            filter,
            counter: Arc::new(FallbackCounter::new()),
            events: None,
        }
    }

    /// Share a fallback counter with other pipelines writing to the same directory.
    pub fn with_counter(mut self, counter: Arc<FallbackCounter>) -> Self {
        self.counter = counter;
        self
    }

    pub fn with_events(mut self, events: Sender<PipelineEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Parse `producer` and download everything it accepts.
    ///
    /// Returns once the source is exhausted and every worker has seen the
    /// terminator. Per-URL failures only show up in the report; an error
    /// means a thread panicked.
    pub fn run(self, producer: Producer) -> Result<RunReport> {
        let Pipeline {
            settings,
            filter,
            counter,
            events,
        } = self;
        let queue = UrlQueue::new(settings.queue_capacity);
        let downloader = Downloader::from_settings(&settings, counter);
        // Hand-built settings can carry 0 workers.
        let workers = settings.workers.max(1);

        tracing::info!(
            workers,
            queue_capacity = queue.capacity(),
            save_dir = %settings.save_dir.display(),
            "pipeline started"
        );

        let (producer_result, consumer_results) = thread::scope(|s| {
            let mut handles = Vec::with_capacity(workers);
            for worker in 0..workers {
                let queue = &queue;
                let downloader = downloader.clone();
                let tx = events.clone();
                handles.push(s.spawn(move || run_consumer(worker, queue, &downloader, tx.as_ref())));
            }

            let queue = &queue;
            let filter = &filter;
            let tx = events.clone();
            let parser = s.spawn(move || {
                let _guard = TerminateOnPanic(queue);
                producer.run(queue, filter, tx.as_ref())
            });

            let producer_result = parser.join();
            let consumer_results: Vec<thread::Result<ConsumerStats>> =
                handles.into_iter().map(|h| h.join()).collect();
            (producer_result, consumer_results)
        });

        let producer_stats = producer_result.map_err(|_| anyhow!("URL parser thread panicked"))?;
        let mut report = RunReport::new(settings.save_dir.clone(), workers, producer_stats);
        for (worker, result) in consumer_results.into_iter().enumerate() {
            let stats = result.map_err(|_| anyhow!("downloader {} panicked", worker))?;
            report.abandoned += stats.abandoned;
            report.saved.extend(stats.saved);
        }
        report.queue_remaining = queue.len();

        tracing::info!(
            lines = report.lines,
            accepted = report.accepted,
            saved = report.saved.len(),
            abandoned = report.abandoned,
            "pipeline finished"
        );
        Ok(report)
    }
}
