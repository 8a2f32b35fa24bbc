//! Logging init: file under the configured log dir (or XDG state dir), or graceful fallback to stderr.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::ImgdlConfig;

const DEFAULT_DIRECTIVES: &str = "info,imgdl_core=debug";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Writer that is either a file or stderr (used when file clone fails).
enum FileOrStderr {
    File(std::fs::File),
    Stderr,
}

impl io::Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

/// Directory `imgdl.log` is written to: `log_dir` from config, else `~/.local/state/imgdl`.
pub fn log_dir(cfg: &ImgdlConfig) -> Result<PathBuf> {
    match &cfg.log_dir {
        Some(dir) => Ok(dir.clone()),
        None => {
            let xdg_dirs = xdg::BaseDirectories::with_prefix("imgdl")?;
            Ok(xdg_dirs.get_state_home())
        }
    }
}

/// Maps the configured level name to filter directives.
///
/// Returns the directives and whether the configured name was rejected.
fn directives(level: Option<&str>) -> (String, bool) {
    match level.map(|l| l.trim().to_ascii_lowercase()) {
        None => (DEFAULT_DIRECTIVES.to_string(), false),
        Some(l) if l == "warning" => ("warn".to_string(), false),
        Some(l) if LOG_LEVELS.contains(&l.as_str()) => (l, false),
        Some(_) => ("info".to_string(), true),
    }
}

fn env_filter(cfg: &ImgdlConfig) -> (EnvFilter, bool) {
    let (dirs, rejected) = directives(cfg.log_level.as_deref());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(dirs));
    (filter, rejected)
}

fn warn_if_rejected(cfg: &ImgdlConfig, rejected: bool) {
    if rejected {
        tracing::warn!(
            "log_level {:?} is not a known level; logging at info",
            cfg.log_level.as_deref().unwrap_or_default()
        );
    }
}

/// Initialize structured logging to `<log_dir>/imgdl.log`.
/// On failure (e.g. log dir unwritable), returns Err so the caller can fall back to stderr.
pub fn init_logging(cfg: &ImgdlConfig) -> Result<PathBuf> {
    let log_dir = log_dir(cfg)?;

    fs::create_dir_all(&log_dir)?;
    let log_file_path: PathBuf = log_dir.join("imgdl.log");

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    struct FileMakeWriter(std::fs::File);

    impl<'a> MakeWriter<'a> for FileMakeWriter {
        type Writer = FileOrStderr;

        fn make_writer(&'a self) -> Self::Writer {
            self.0
                .try_clone()
                .map(FileOrStderr::File)
                .unwrap_or(FileOrStderr::Stderr)
        }
    }

    let writer: BoxMakeWriter = BoxMakeWriter::new(FileMakeWriter(file));
    let (env_filter, rejected) = env_filter(cfg);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    tracing::info!("imgdl logging initialized at {}", log_file_path.display());
    warn_if_rejected(cfg, rejected);

    Ok(log_dir)
}

/// Initialize logging to stderr only (no file). Use when init_logging() fails so the CLI doesn't crash.
pub fn init_logging_stderr(cfg: &ImgdlConfig) {
    let (env_filter, rejected) = env_filter(cfg);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
    warn_if_rejected(cfg, rejected);
}
