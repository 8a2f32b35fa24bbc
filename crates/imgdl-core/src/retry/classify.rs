//! Map fetch errors onto retry policy error kinds.

use super::error::FetchError;
use super::policy::ErrorKind;

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_ssl_connect_error()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::Curl(ce) => classify_curl_error(ce),
        FetchError::Http(code) => ErrorKind::HttpStatus(*code),
        FetchError::Storage(_) => ErrorKind::Storage,
        FetchError::Stalled(_) => ErrorKind::Timeout,
        FetchError::InvalidUrl(_) | FetchError::Interrupted { .. } => ErrorKind::Other,
    }
}
