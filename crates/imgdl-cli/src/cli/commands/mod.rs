//! CLI command handlers, one file per command.

mod config;
mod probe;
mod run;

pub use config::run_config;
pub use probe::run_probe;
pub use run::{run_pipeline, RunOptions};
