//! Retry policy for network requests.
//!
//! Errors are classified (timeout, connection, HTTP status, storage) and only
//! timeouts are retried, up to the configured number of reattempts. Both the
//! serviceability probe and the downloader share this policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
