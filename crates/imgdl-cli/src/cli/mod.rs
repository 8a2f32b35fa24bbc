//! CLI for the imgdl image downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use imgdl_core::config::{self, ImgdlConfig};
use imgdl_core::logging;
use std::path::{Path, PathBuf};

use commands::{run_config, run_pipeline, run_probe, RunOptions};

/// Top-level CLI for imgdl.
#[derive(Debug, Parser)]
#[command(name = "imgdl")]
#[command(about = "imgdl: download the images listed in a URL file", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of ~/.config/imgdl/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Filter the URLs in a file and download every image.
    Run {
        /// File with one URL per line (UTF-8, or UTF-16/32 with a byte order mark).
        #[arg(short, long, value_name = "PATH")]
        file: PathBuf,
        /// Directory images are saved to (overrides save_dir).
        #[arg(long, value_name = "DIR")]
        save_dir: Option<PathBuf>,
        /// Per-request timeout in seconds; 0 disables it (overrides url_timeout_secs).
        #[arg(long, value_name = "SECS")]
        timeout: Option<f64>,
        /// Retries after a timeout (overrides max_reattempts).
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        retries: Option<i64>,
        /// Number of parallel downloaders (overrides workers).
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
        /// Print the run report as JSON.
        #[arg(long)]
        json: bool,
        /// Only print the summary.
        #[arg(long, short)]
        quiet: bool,
    },

    /// Check whether a single URL would be downloaded.
    Probe {
        /// URL to probe with a HEAD request.
        url: String,
        #[arg(long, value_name = "SECS")]
        timeout: Option<f64>,
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        retries: Option<i64>,
    },

    /// Show the config file location and its values.
    Config,
}

fn load_config(explicit: Option<&Path>) -> Result<ImgdlConfig> {
    match explicit {
        Some(path) => config::load_from(path),
        None => config::load_or_init(),
    }
}

/// Start logging; a log file that cannot be opened falls back to stderr.
fn start_logging(cfg: &ImgdlConfig) -> Option<PathBuf> {
    match logging::init_logging(cfg) {
        Ok(dir) => Some(dir),
        Err(e) => {
            logging::init_logging_stderr(cfg);
            tracing::warn!("log file unavailable ({:#}); logging to stderr", e);
            None
        }
    }
}

/// Apply command-line overrides to the loaded config.
fn apply_overrides(
    cfg: &mut ImgdlConfig,
    save_dir: Option<PathBuf>,
    timeout: Option<f64>,
    retries: Option<i64>,
    workers: Option<usize>,
) {
    if let Some(dir) = save_dir {
        cfg.save_dir = dir;
    }
    if let Some(t) = timeout {
        cfg.url_timeout_secs = t;
    }
    if let Some(r) = retries {
        cfg.max_reattempts = r;
    }
    if let Some(w) = workers {
        cfg.workers = w;
    }
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = load_config(cli.config.as_deref())?;
        let log_dir = start_logging(&cfg);
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                file,
                save_dir,
                timeout,
                retries,
                workers,
                json,
                quiet,
            } => {
                apply_overrides(&mut cfg, save_dir, timeout, retries, workers);
                let opts = RunOptions { json, quiet };
                run_pipeline(&cfg, &file, log_dir.as_deref(), opts)?;
            }
            CliCommand::Probe {
                url,
                timeout,
                retries,
            } => {
                apply_overrides(&mut cfg, None, timeout, retries, None);
                run_probe(&cfg, &url)?;
            }
            CliCommand::Config => run_config(&cfg, cli.config.as_deref())?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
