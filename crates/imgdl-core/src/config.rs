use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::url_model::is_image_extension;

const DEFAULT_SAVE_DIR: &str = "./downloaded_images";
const DEFAULT_TIMEOUT_SECS: f64 = 2.0;
const DEFAULT_EXTENSION: &str = "jfif";
/// libcurl's receive buffer range (`CURLOPT_BUFFERSIZE`; the upper bound of older releases).
const MIN_BUFFER_BYTES: usize = 1024;
const MAX_BUFFER_BYTES: usize = 512 * 1024;

fn default_save_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SAVE_DIR)
}

fn default_timeout_secs() -> f64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_reattempts() -> i64 {
    2
}

fn default_workers() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    50
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_buffer_bytes() -> usize {
    1024
}

/// Configuration loaded from `~/.config/imgdl/config.toml`.
///
/// Values here are raw user input; [`ImgdlConfig::validate`] turns them into the
/// immutable [`Settings`] snapshot the pipeline runs with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImgdlConfig {
    /// Directory downloaded images are written to.
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,
    /// Per-request timeout in seconds. `0` disables the timeout.
    #[serde(default = "default_timeout_secs")]
    pub url_timeout_secs: f64,
    /// Extra attempts after a timed-out request (HEAD probe and GET alike).
    #[serde(default = "default_max_reattempts")]
    pub max_reattempts: i64,
    /// Proxy per URL scheme, e.g. `https = "http://proxy:3128"`. Key `all` matches any scheme.
    #[serde(default)]
    pub proxy: BTreeMap<String, String>,
    /// Comma-separated hosts that bypass the proxy.
    #[serde(default)]
    pub no_proxy: Option<String>,
    /// Number of downloader threads.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Capacity of the URL queue between parser and downloaders.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Extension given to images whose URL has no recognised image extension.
    #[serde(default = "default_extension")]
    pub default_extension: String,
    /// Chunk size in bytes used while streaming a response body to disk.
    #[serde(default = "default_buffer_bytes")]
    pub buffer_bytes: usize,
    /// Directory for `imgdl.log`; XDG state dir when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// Log level name (trace, debug, info, warn, error).
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for ImgdlConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            url_timeout_secs: default_timeout_secs(),
            max_reattempts: default_max_reattempts(),
            proxy: BTreeMap::new(),
            no_proxy: None,
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            default_extension: default_extension(),
            buffer_bytes: default_buffer_bytes(),
            log_dir: None,
            log_level: None,
        }
    }
}

/// Validated, immutable settings snapshot shared by the parser and the downloaders.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub save_dir: PathBuf,
    /// `None` means requests never time out.
    pub timeout: Option<Duration>,
    pub max_reattempts: u32,
    pub proxy: BTreeMap<String, String>,
    pub no_proxy: Option<String>,
    pub workers: usize,
    pub queue_capacity: usize,
    pub default_extension: String,
    pub buffer_bytes: usize,
}

impl ImgdlConfig {
    /// Check every value, replacing invalid ones with defaults, and create the save directory.
    ///
    /// Each correction is logged. Failing to create `save_dir` is fatal: the
    /// pipeline must not start without somewhere to write.
    pub fn validate(&self) -> Result<Settings> {
        let settings = self.settings();
        fs::create_dir_all(&settings.save_dir).with_context(|| {
            format!("cannot create save directory {}", settings.save_dir.display())
        })?;
        Ok(settings)
    }

    /// Same corrections as [`validate`](Self::validate), without touching the filesystem.
    pub fn settings(&self) -> Settings {
        let timeout = if self.url_timeout_secs == 0.0 {
            None
        } else {
            match Duration::try_from_secs_f64(self.url_timeout_secs) {
                Ok(t) => Some(t),
                Err(_) => {
                    tracing::warn!(
                        "url_timeout_secs is {}; using the default of {} seconds",
                        self.url_timeout_secs,
                        DEFAULT_TIMEOUT_SECS
                    );
                    Some(Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS))
                }
            }
        };

        let max_reattempts = match u32::try_from(self.max_reattempts) {
            Ok(n) => n,
            Err(_) if self.max_reattempts < 0 => {
                tracing::info!(
                    "max_reattempts is negative ({}); timed-out requests will not be retried",
                    self.max_reattempts
                );
                0
            }
            Err(_) => u32::MAX,
        };

        let workers = if self.workers == 0 {
            tracing::warn!("workers is 0; running a single downloader");
            1
        } else {
            self.workers
        };

        let queue_capacity = if self.queue_capacity == 0 {
            tracing::warn!("queue_capacity is 0; using a capacity of 1");
            1
        } else {
            self.queue_capacity
        };

        let ext = self.default_extension.trim_start_matches('.');
        let default_extension = if is_image_extension(ext) {
            ext.to_string()
        } else {
            tracing::warn!(
                "default_extension {:?} is not an image extension; using {}",
                self.default_extension,
                DEFAULT_EXTENSION
            );
            DEFAULT_EXTENSION.to_string()
        };

        let buffer_bytes = self.buffer_bytes.clamp(MIN_BUFFER_BYTES, MAX_BUFFER_BYTES);
        if buffer_bytes != self.buffer_bytes {
            tracing::warn!(
                "buffer_bytes is {}; libcurl accepts {}..={}, using {}",
                self.buffer_bytes,
                MIN_BUFFER_BYTES,
                MAX_BUFFER_BYTES,
                buffer_bytes
            );
        }

        let proxy: BTreeMap<String, String> = self
            .proxy
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
            .collect();

        Settings {
            save_dir: self.save_dir.clone(),
            timeout,
            max_reattempts,
            proxy,
            no_proxy: self.no_proxy.clone(),
            workers,
            queue_capacity,
            default_extension,
            buffer_bytes,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ImgdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ImgdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit file. Missing keys take their defaults.
pub fn load_from(path: &Path) -> Result<ImgdlConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    let cfg: ImgdlConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
