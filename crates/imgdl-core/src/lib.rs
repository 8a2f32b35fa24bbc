pub mod config;
pub mod logging;

pub mod downloader;
pub mod fetch_head;
pub mod filter;
pub mod pipeline;
pub mod queue;
pub mod retry;
pub mod source;
pub mod storage;
pub mod transport;
pub mod url_model;
