//! `imgdl probe <url>` – show the serviceability verdict for one URL.

use anyhow::Result;
use imgdl_core::config::ImgdlConfig;
use imgdl_core::filter::{ServiceabilityFilter, Verdict};
use imgdl_core::retry::RetryPolicy;
use imgdl_core::transport::HttpOptions;
use imgdl_core::url_model::candidate_name;

pub fn run_probe(cfg: &ImgdlConfig, url: &str) -> Result<()> {
    let settings = cfg.settings();
    let filter = ServiceabilityFilter::new(
        HttpOptions::from_settings(&settings),
        RetryPolicy::new(settings.max_reattempts),
    );
    match filter.check(url) {
        Verdict::Serviceable { content_type } => {
            println!("serviceable: {}", content_type);
            match candidate_name(url) {
                Some(name) => println!("name from URL: {}", name),
                None => println!("name from URL: none (a fallback name will be used)"),
            }
        }
        Verdict::NotImage {
            content_type: Some(ct),
        } => println!("not an image: {}", ct),
        Verdict::NotImage { content_type: None } => println!("not an image: no content type"),
        Verdict::Unreachable(e) => println!("unreachable: {}", e),
    }
    Ok(())
}
