//! Per-request error type used for retry classification.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Error from a single HEAD or GET attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL is empty, unparseable, or not http(s).
    #[error("invalid URL {0:?}")]
    InvalidUrl(String),
    /// Curl reported an error (timeout, connection, redirect limit, etc.).
    #[error(transparent)]
    Curl(#[from] curl::Error),
    /// The final response carried an unacceptable status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Creating or writing the destination file failed. Not retried.
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
    /// No body data arrived for the whole window before the file was created.
    #[error("no data received for {0:?}")]
    Stalled(Duration),
    /// The transfer failed after the destination file was created. Not retried;
    /// the partial file stays on disk.
    #[error("transfer stopped after {written} bytes were written to {}", path.display())]
    Interrupted {
        path: PathBuf,
        written: u64,
        #[source]
        source: curl::Error,
    },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::Curl(e) => e.is_operation_timedout(),
            FetchError::Stalled(_) => true,
            _ => false,
        }
    }
}
