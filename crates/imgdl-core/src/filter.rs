//! Serviceability filter: decides from response metadata alone whether a URL is worth downloading.

use crate::fetch_head::{self, HeadResult};
use crate::retry::{run_with_retry, FetchError, RetryPolicy};
use crate::transport::HttpOptions;

/// Decides whether the producer enqueues a URL.
pub trait UrlFilter: Send + Sync {
    fn accept(&self, url: &str) -> bool;
}

impl<F> UrlFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn accept(&self, url: &str) -> bool {
        self(url)
    }
}

/// True if a `Content-Type` value denotes image content.
pub fn is_image_content_type(content_type: Option<&str>) -> bool {
    match content_type {
        Some(ct) => {
            let ct = ct.to_ascii_lowercase();
            ct.contains("image") || ct.contains("png")
        }
        None => false,
    }
}

/// Outcome of probing one URL.
#[derive(Debug)]
pub enum Verdict {
    Serviceable { content_type: String },
    /// Reachable, but the content type is missing or not an image.
    NotImage { content_type: Option<String> },
    /// The probe failed: permanent error or timeouts beyond the retry budget.
    Unreachable(FetchError),
}

impl Verdict {
    pub fn is_serviceable(&self) -> bool {
        matches!(self, Verdict::Serviceable { .. })
    }
}

/// HEAD-probes URLs, retrying timeouts according to the policy.
#[derive(Debug, Clone)]
pub struct ServiceabilityFilter {
    http: HttpOptions,
    policy: RetryPolicy,
}

impl ServiceabilityFilter {
    pub fn new(http: HttpOptions, policy: RetryPolicy) -> Self {
        Self { http, policy }
    }

    pub fn check(&self, url: &str) -> Verdict {
        let head: HeadResult =
            match run_with_retry(&self.policy, url, || fetch_head::probe(url, &self.http)) {
                Ok(h) => h,
                Err(e) => {
                    tracing::info!(url, "probe failed: {}", e);
                    return Verdict::Unreachable(e);
                }
            };
        match head.content_type {
            Some(ct) if is_image_content_type(Some(&ct)) => Verdict::Serviceable { content_type: ct },
            content_type => Verdict::NotImage { content_type },
        }
    }

    pub fn is_serviceable(&self, url: &str) -> bool {
        let verdict = self.check(url);
        if !verdict.is_serviceable() {
            tracing::debug!(url, "URL is not serviceable");
        }
        verdict.is_serviceable()
    }
}

impl UrlFilter for ServiceabilityFilter {
    fn accept(&self, url: &str) -> bool {
        self.is_serviceable(url)
    }
}
