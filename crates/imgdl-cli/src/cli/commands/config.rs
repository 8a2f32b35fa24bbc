//! `imgdl config` – show where the config lives and what it contains.

use anyhow::Result;
use imgdl_core::config::{self, ImgdlConfig};
use std::path::Path;

pub fn run_config(cfg: &ImgdlConfig, explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
