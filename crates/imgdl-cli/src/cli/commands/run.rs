//! `imgdl run -f <file>` – parse the URL file and download the images.

use anyhow::Result;
use imgdl_core::config::ImgdlConfig;
use imgdl_core::pipeline::{Pipeline, PipelineEvent, RunReport};
use imgdl_core::source::Producer;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub json: bool,
    pub quiet: bool,
}

fn print_event(event: &PipelineEvent) {
    match event {
        PipelineEvent::Saved { worker, file } => println!(
            "[{}] saved {} ({} bytes) <- {}",
            worker,
            file.path.display(),
            file.bytes,
            file.url
        ),
        PipelineEvent::Abandoned {
            worker,
            url,
            reason,
        } => println!("[{}] failed {}: {}", worker, url, reason),
        PipelineEvent::Accepted { .. } | PipelineEvent::Rejected { .. } => {}
    }
}

fn print_summary(report: &RunReport) {
    println!(
        "{} lines, {} accepted, {} rejected",
        report.lines, report.accepted, report.rejected
    );
    println!(
        "{} saved ({} bytes), {} failed",
        report.saved.len(),
        report.saved_bytes(),
        report.abandoned
    );
}

pub fn run_pipeline(
    cfg: &ImgdlConfig,
    file: &Path,
    log_dir: Option<&Path>,
    opts: RunOptions,
) -> Result<()> {
    let settings = cfg.validate()?;
    let producer = Producer::open(file)?;
    let show_progress = !opts.json;

    if show_progress {
        println!("Saving images to {}", settings.save_dir.display());
        match log_dir {
            Some(dir) => println!("Logging to {}", dir.display()),
            None => println!("Logging to stderr"),
        }
    }

    let (tx, rx) = mpsc::channel::<PipelineEvent>();
    let report = thread::scope(|s| {
        s.spawn(move || {
            for event in rx {
                if show_progress && !opts.quiet {
                    print_event(&event);
                }
            }
        });
        Pipeline::from_settings(settings).with_events(tx).run(producer)
    })?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}
