//! Image downloader: streamed GET with timeout retries, written to a
//! collision-free file in the save directory.

mod consumer;
mod fetch;

pub use consumer::{run_consumer, ConsumerStats};

use std::sync::Arc;

use crate::config::Settings;
use crate::retry::{run_with_retry, FetchError, RetryPolicy};
use crate::storage::SavedFile;
use crate::transport::HttpOptions;
use crate::url_model::{FallbackCounter, FilenameResolver};

/// Everything one worker needs to fetch and persist URLs.
///
/// Clones share the fallback counter of their resolver.
#[derive(Debug, Clone)]
pub struct Downloader {
    http: HttpOptions,
    policy: RetryPolicy,
    resolver: FilenameResolver,
}

impl Downloader {
    pub fn new(http: HttpOptions, policy: RetryPolicy, resolver: FilenameResolver) -> Self {
        Self {
            http,
            policy,
            resolver,
        }
    }

    pub fn from_settings(settings: &Settings, counter: Arc<FallbackCounter>) -> Self {
        Self::new(
            HttpOptions::from_settings(settings),
            RetryPolicy::new(settings.max_reattempts),
            FilenameResolver::new(
                settings.save_dir.clone(),
                settings.default_extension.clone(),
                counter,
            ),
        )
    }

    pub fn resolver(&self) -> &FilenameResolver {
        &self.resolver
    }

    /// Fetch `url` and save it, retrying timeouts up to the configured budget.
    ///
    /// Errors are logged here; callers only need them for reporting.
    pub fn download(&self, url: &str) -> Result<SavedFile, FetchError> {
        let result = run_with_retry(&self.policy, url, || {
            fetch::fetch_to_file(url, &self.http, &self.resolver)
        });
        match &result {
            Ok(saved) => tracing::info!(
                url,
                path = %saved.path.display(),
                bytes = saved.bytes,
                "image saved"
            ),
            Err(FetchError::Http(code)) => {
                tracing::info!(url, status = code, "URL has not been downloaded")
            }
            Err(e) => tracing::info!(url, "URL has not been downloaded: {}", e),
        }
        result
    }
}
