//! `leech classify` – copy files inside the size bounds to the accepted set.

use anyhow::{Context, Result};
use clap::Args;
use leech_core::classify::{self, SizeBounds};
use leech_core::config::LeechConfig;
use std::path::PathBuf;
use std::time::Instant;

use super::progress::{format_progress, redraw, Throttle, PROGRESS_INTERVAL};

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Directory of downloaded files (overrides classify.source_dir).
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,
    /// Directory that receives accepted copies.
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,
    /// Exclusive lower bound in KiB.
    #[arg(long, value_name = "KIB")]
    pub min_kib: Option<u64>,
    /// Exclusive upper bound in KiB.
    #[arg(long, value_name = "KIB")]
    pub max_kib: Option<u64>,
}

impl ClassifyArgs {
    /// Overlay command-line values on the loaded config.
    pub fn apply(&self, cfg: &mut LeechConfig) {
        if let Some(dir) = &self.source {
            cfg.classify.source_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.dest {
            cfg.classify.dest_dir = dir.clone();
        }
        if let Some(n) = self.min_kib {
            cfg.classify.min_kib = n;
        }
        if let Some(n) = self.max_kib {
            cfg.classify.max_kib = n;
        }
    }
}

pub async fn run_classify(cfg: &LeechConfig) -> Result<()> {
    let source = cfg
        .classify
        .source_dir
        .clone()
        .context("no source directory: pass --source or set classify.source_dir in the config")?;
    let dest = cfg.classify.dest_dir.clone();
    let bounds = SizeBounds::new(cfg.classify.min_kib, cfg.classify.max_kib);
    println!(
        "Classifying {} -> {} ({} < KiB < {})",
        source.display(),
        dest.display(),
        bounds.min_kib,
        bounds.max_kib
    );

    let summary = tokio::task::spawn_blocking(move || {
        let mut throttle = Throttle::new(PROGRESS_INTERVAL);
        let mut drawn = false;
        let summary = classify::classify_dir_with_progress(&source, &dest, bounds, |done, total| {
            if throttle.ready(Instant::now(), done, total) {
                redraw(&format_progress("Files", done, total));
                drawn = true;
            }
        });
        if drawn {
            println!();
        }
        summary
    })
    .await
    .context("classify task join")??;

    println!(
        "Scanned: {}  Copied: {}  Rejected: {}  Errors: {}",
        summary.scanned, summary.copied, summary.rejected, summary.errors
    );
    Ok(())
}
