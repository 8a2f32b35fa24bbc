//! Shared libcurl settings for the HEAD probe and the streamed GET.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::Settings;

/// Redirect cap; exceeding it is a permanent failure (`CURLE_TOO_MANY_REDIRECTS`).
pub const MAX_REDIRECTIONS: u32 = 30;

/// Network options applied to every curl handle the pipeline creates.
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    /// `None` disables timeouts entirely.
    pub timeout: Option<Duration>,
    /// Proxy URL per lowercase scheme; `all` matches any scheme.
    pub proxy: BTreeMap<String, String>,
    pub no_proxy: Option<String>,
    /// Receive buffer size, i.e. the size of chunks handed to the write callback.
    pub buffer_bytes: Option<usize>,
}

impl HttpOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            timeout: settings.timeout,
            proxy: settings.proxy.clone(),
            no_proxy: settings.no_proxy.clone(),
            buffer_bytes: Some(settings.buffer_bytes),
        }
    }

    /// Proxy configured for the scheme of `url`, falling back to the `all` entry.
    pub fn proxy_for(&self, url: &str) -> Option<&str> {
        let scheme = url
            .split_once("://")
            .map(|(s, _)| s.to_ascii_lowercase())
            .unwrap_or_default();
        self.proxy
            .get(&scheme)
            .or_else(|| self.proxy.get("all"))
            .map(String::as_str)
    }

    fn apply_common(&self, easy: &mut curl::easy::Easy, url: &str) -> Result<(), curl::Error> {
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTIONS)?;
        if let Some(proxy) = self.proxy_for(url) {
            easy.proxy(proxy)?;
        }
        if let Some(hosts) = &self.no_proxy {
            easy.noproxy(hosts)?;
        }
        if let Some(t) = self.timeout {
            easy.connect_timeout(t)?;
        }
        Ok(())
    }

    /// Configure a HEAD request. The timeout bounds the whole exchange.
    pub fn configure_head(&self, easy: &mut curl::easy::Easy, url: &str) -> Result<(), curl::Error> {
        self.apply_common(easy, url)?;
        easy.nobody(true)?;
        if let Some(t) = self.timeout {
            easy.timeout(t)?;
        }
        Ok(())
    }

    /// Configure a streamed GET.
    ///
    /// The timeout applies to connecting here. Stalls while waiting for body
    /// data are caught by the caller's progress callback, which this enables;
    /// the total transfer time is never limited.
    pub fn configure_get(&self, easy: &mut curl::easy::Easy, url: &str) -> Result<(), curl::Error> {
        self.apply_common(easy, url)?;
        if self.timeout.is_some() {
            easy.progress(true)?;
        }
        if let Some(sz) = self.buffer_bytes {
            easy.buffer_size(sz)?;
        }
        Ok(())
    }
}
