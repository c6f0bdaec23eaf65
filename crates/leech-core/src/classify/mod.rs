//! Size classifier: copy files whose size in KiB lies strictly between two
//! bounds from a source directory into a destination directory.
//!
//! Purely size based; nothing is moved or deleted from the source. Files are
//! visited one at a time in name order.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Exclusive KiB bounds. Size is `len / 1024` with integer truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBounds {
    pub min_kib: u64,
    pub max_kib: u64,
}

impl Default for SizeBounds {
    fn default() -> Self {
        Self {
            min_kib: 70,
            max_kib: 90,
        }
    }
}

impl SizeBounds {
    pub fn new(min_kib: u64, max_kib: u64) -> Self {
        Self { min_kib, max_kib }
    }

    /// True if a file of `len_bytes` bytes belongs in the accepted subset.
    pub fn accepts(&self, len_bytes: u64) -> bool {
        let kib = len_bytes / 1024;
        kib > self.min_kib && kib < self.max_kib
    }
}

/// Counts for one classifier pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifySummary {
    /// Regular files examined.
    pub scanned: usize,
    pub copied: usize,
    /// Files outside the bounds (left untouched).
    pub rejected: usize,
    /// Files that could not be read or copied.
    pub errors: usize,
}

/// Classify every regular file in `source` into `dest`.
pub fn classify_dir(source: &Path, dest: &Path, bounds: SizeBounds) -> Result<ClassifySummary> {
    classify_dir_with_progress(source, dest, bounds, |_, _| {})
}

/// Like [`classify_dir`], calling `on_progress(done, total)` after each file.
pub fn classify_dir_with_progress<P>(
    source: &Path,
    dest: &Path,
    bounds: SizeBounds,
    mut on_progress: P,
) -> Result<ClassifySummary>
where
    P: FnMut(usize, usize),
{
    fs::create_dir_all(dest).with_context(|| format!("create {}", dest.display()))?;
    let files = list_files(source)?;
    let total = files.len();
    let mut summary = ClassifySummary::default();

    for (i, path) in files.into_iter().enumerate() {
        summary.scanned += 1;
        match classify_file(&path, dest, bounds) {
            Ok(true) => summary.copied += 1,
            Ok(false) => summary.rejected += 1,
            Err(e) => {
                tracing::warn!(file = %path.display(), "skipping {}: {:#}", path.display(), e);
                summary.errors += 1;
            }
        }
        on_progress(i + 1, total);
    }

    tracing::info!(
        source = %source.display(),
        dest = %dest.display(),
        scanned = summary.scanned,
        copied = summary.copied,
        rejected = summary.rejected,
        errors = summary.errors,
        "classification finished"
    );
    Ok(summary)
}

/// Regular files directly under `dir`, sorted by name.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("list {}", dir.display()))? {
        let entry = entry.with_context(|| format!("list {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read `path` fully and copy it to `dest` if accepted. Returns whether it was copied.
fn classify_file(path: &Path, dest: &Path, bounds: SizeBounds) -> Result<bool> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let len = bytes.len() as u64;
    if !bounds.accepts(len) {
        tracing::trace!(file = %path.display(), kib = len / 1024, "outside bounds");
        return Ok(false);
    }
    let name = path
        .file_name()
        .with_context(|| format!("no file name in {}", path.display()))?;
    let target = dest.join(name);
    fs::write(&target, &bytes).with_context(|| format!("write {}", target.display()))?;
    tracing::debug!(file = %path.display(), kib = len / 1024, "copied");
    Ok(true)
}
