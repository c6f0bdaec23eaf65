//! `leech crawl` – walk catalog pages and download main images.

use anyhow::{Context, Result};
use clap::Args;
use leech_core::config::LeechConfig;
use leech_core::crawl::{self, PageProgress};
use leech_core::http::HttpClient;
use std::path::PathBuf;
use std::time::Instant;

use super::progress::{format_empty_page, format_progress, redraw, Throttle, PROGRESS_INTERVAL};

#[derive(Debug, Args)]
pub struct CrawlArgs {
    /// First catalog page (inclusive).
    #[arg(long, value_name = "N")]
    pub first_page: Option<u32>,
    /// Last catalog page (inclusive).
    #[arg(long, value_name = "N")]
    pub last_page: Option<u32>,
    /// Maximum concurrent product fetches per page.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,
    /// Directory that receives downloaded images.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
    /// Skip TLS certificate verification (unsafe; for debugging proxies only).
    #[arg(long)]
    pub insecure: bool,
}

impl CrawlArgs {
    /// Overlay command-line values on the loaded config.
    pub fn apply(&self, cfg: &mut LeechConfig) {
        if let Some(n) = self.first_page {
            cfg.catalog.first_page = n;
        }
        if let Some(n) = self.last_page {
            cfg.catalog.last_page = n;
        }
        if let Some(n) = self.workers {
            cfg.fetch.workers = n;
        }
        if let Some(dir) = &self.output_dir {
            cfg.fetch.output_dir = dir.clone();
        }
        if self.insecure {
            cfg.http.verify_tls = false;
        }
    }
}

pub async fn run_crawl(cfg: &LeechConfig) -> Result<()> {
    println!(
        "Starting image download to folder: {}",
        cfg.fetch.output_dir.display()
    );
    if !cfg.http.verify_tls {
        println!("WARNING: TLS certificate verification is disabled");
    }

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<PageProgress>(64);
    let progress_handle = tokio::spawn(async move {
        let mut throttle = Throttle::new(PROGRESS_INTERVAL);
        let mut open_page: Option<u32> = None;
        while let Some(p) = progress_rx.recv().await {
            if open_page.is_some_and(|page| page != p.page) {
                println!();
                open_page = None;
            }
            if p.total == 0 {
                println!("  {}", format_empty_page(p.page));
                continue;
            }
            if throttle.ready(Instant::now(), p.done, p.total) {
                redraw(&format_progress(&format!("Page {}", p.page), p.done, p.total));
                open_page = Some(p.page);
            }
        }
        if open_page.is_some() {
            println!();
        }
    });

    let client = HttpClient::from_config(&cfg.http);
    let catalog = cfg.catalog.clone();
    let fetch = cfg.fetch.clone();
    let summary = tokio::task::spawn_blocking(move || {
        crawl::run_crawl(&client, &catalog, &fetch, Some(&progress_tx))
    })
    .await
    .context("crawl task join")?;
    progress_handle.await.context("progress task join")?;

    println!(
        "Pages: {} ({} empty)  Products: {}  Saved: {}  Failed: {}",
        summary.pages_visited,
        summary.empty_pages,
        summary.products_found,
        summary.images_saved,
        summary.failures
    );
    println!("Download completed!");
    Ok(())
}
