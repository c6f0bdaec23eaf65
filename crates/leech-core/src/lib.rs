pub mod config;
pub mod error;
pub mod logging;

pub mod catalog;
pub mod classify;
pub mod crawl;
pub mod fetcher;
pub mod http;
pub mod pool;
