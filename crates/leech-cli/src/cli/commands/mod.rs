//! CLI command handlers. Each command is in its own file.

mod classify;
mod completions;
mod config;
mod crawl;
mod progress;

pub use classify::{run_classify, ClassifyArgs};
pub use completions::run_completions;
pub use config::run_show_config;
pub use crawl::{run_crawl, CrawlArgs};
