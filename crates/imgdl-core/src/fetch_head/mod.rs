//! HTTP HEAD / metadata probing.
//!
//! Uses the curl crate (libcurl) to fetch response headers without
//! transferring the body, following redirects to the final resource.

mod parse;

pub(crate) use parse::status_code;

use std::str;

use crate::retry::FetchError;
use crate::transport::HttpOptions;

/// Metadata of the final response of a HEAD request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadResult {
    pub status: u32,
    /// `Content-Type` value if present.
    pub content_type: Option<String>,
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
}

/// Reject anything curl would otherwise guess a scheme for (e.g. `www.example.com`).
pub(crate) fn check_url(url: &str) -> Result<(), FetchError> {
    match url::Url::parse(url) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.has_host() => Ok(()),
        _ => Err(FetchError::InvalidUrl(url.to_string())),
    }
}

/// Performs a HEAD request and returns the final response's metadata.
///
/// Follows redirects. A non-2xx final status is an error.
/// Runs in the current thread.
pub fn probe(url: &str, http: &HttpOptions) -> Result<HeadResult, FetchError> {
    check_url(url)?;
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    http.configure_head(&mut easy, url)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }

    Ok(parse::parse_headers(code, &headers))
}
