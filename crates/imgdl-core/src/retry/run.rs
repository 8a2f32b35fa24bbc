//! Retry loop: run a closure until success or policy says stop.

use super::classify;
use super::error::FetchError;
use super::policy::{RetryDecision, RetryPolicy};

/// Runs `f` until it succeeds or the policy gives up, returning the last error.
///
/// `url` only labels the log lines.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, url: &str, mut f: F) -> Result<T, FetchError>
where
    F: FnMut() -> Result<T, FetchError>,
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::Retry => {
                        tracing::info!(
                            url,
                            attempt,
                            remaining = policy.max_attempts() - attempt,
                            "request timed out, retrying: {}",
                            e
                        );
                        attempt += 1;
                    }
                }
            }
        }
    }
}
