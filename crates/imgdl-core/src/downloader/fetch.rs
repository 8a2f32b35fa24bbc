//! Single streamed GET attempt writing the body to a fresh file.

use std::cell::Cell;
use std::io;
use std::time::{Duration, Instant};

use crate::fetch_head::{check_url, status_code};
use crate::retry::FetchError;
use crate::storage::{create_unique, ImageWriter, SavedFile};
use crate::transport::HttpOptions;
use crate::url_model::FilenameResolver;

/// Flags a transfer that received no body bytes for a whole window.
#[derive(Debug)]
struct StallWatch {
    window: Duration,
    received: f64,
    last_change: Instant,
    stalled: bool,
}

impl StallWatch {
    fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            received: 0.0,
            last_change: now,
            stalled: false,
        }
    }

    /// Progress callback body; `false` aborts the transfer.
    fn observe(&mut self, received: f64, now: Instant) -> bool {
        // The counter restarts on each redirect hop, so any change is progress.
        if received != self.received {
            self.received = received;
            self.last_change = now;
            return true;
        }
        if now.duration_since(self.last_change) >= self.window {
            self.stalled = true;
            return false;
        }
        true
    }
}

/// Downloads `url` once.
///
/// The destination is only created when the first body chunk of a 200
/// response arrives; any other status aborts the transfer before a file
/// exists. An empty 200 body still produces an (empty) file.
///
/// Only failures before the file exists can be timeouts. Once bytes are on
/// disk any failure is [`FetchError::Interrupted`], so a retry never leaves a
/// second partial file behind.
pub(super) fn fetch_to_file(
    url: &str,
    http: &HttpOptions,
    resolver: &FilenameResolver,
) -> Result<SavedFile, FetchError> {
    check_url(url)?;

    // Status of the most recent response; redirect hops overwrite it.
    let status = Cell::new(0u32);
    let mut writer: Option<ImageWriter> = None;
    let mut rejected_status: Option<u32> = None;
    let mut storage_error: Option<io::Error> = None;
    let mut watch = http.timeout.map(|t| StallWatch::new(t, Instant::now()));

    let mut easy = curl::easy::Easy::new();
    http.configure_get(&mut easy, url)?;

    let perform_result = {
        let mut transfer = easy.transfer();
        transfer.header_function(|line| {
            if let Some(code) = status_code(line) {
                status.set(code);
            }
            true
        })?;
        transfer.progress_function(|_, dlnow, _, _| match watch.as_mut() {
            Some(w) => w.observe(dlnow, Instant::now()),
            None => true,
        })?;
        transfer.write_function(|data| {
            if writer.is_none() {
                if status.get() != 200 {
                    rejected_status = Some(status.get());
                    return Ok(0);
                }
                match create_unique(resolver, url) {
                    Ok(w) => writer = Some(w),
                    Err(e) => {
                        storage_error = Some(e);
                        return Ok(0);
                    }
                }
            }
            let Some(w) = writer.as_mut() else {
                return Ok(0);
            };
            match w.write_chunk(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    storage_error = Some(e);
                    Ok(0) // abort transfer
                }
            }
        })?;
        transfer.perform()
    };

    if let Err(e) = perform_result {
        if e.is_write_error() {
            if let Some(code) = rejected_status {
                return Err(FetchError::Http(code));
            }
            if let Some(io_err) = storage_error {
                return Err(FetchError::Storage(io_err));
            }
        }
        if let Some(w) = writer.as_ref() {
            return Err(FetchError::Interrupted {
                path: w.path().to_path_buf(),
                written: w.written(),
                source: e,
            });
        }
        if let Some(w) = watch.as_ref().filter(|w| w.stalled) {
            return Err(FetchError::Stalled(w.window));
        }
        return Err(FetchError::Curl(e));
    }

    let code = easy.response_code()?;
    if code != 200 {
        return Err(FetchError::Http(code));
    }

    let writer = match writer {
        Some(w) => w,
        None => create_unique(resolver, url).map_err(FetchError::Storage)?,
    };
    writer.finish(url).map_err(FetchError::Storage)
}
