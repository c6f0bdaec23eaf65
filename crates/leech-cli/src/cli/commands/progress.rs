//! Progress line formatting and throttling shared by `crawl` and `classify`.

use std::io::Write;
use std::time::{Duration, Instant};

/// Minimum time between two redraws of an unfinished progress line.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

/// `"<label>: done/total (pct%)"`; an empty total counts as complete.
pub fn format_progress(label: &str, done: usize, total: usize) -> String {
    let pct = if total == 0 {
        100.0
    } else {
        (done as f64 / total as f64).min(1.0) * 100.0
    };
    format!("{}: {}/{} ({:.0}%)", label, done, total, pct)
}

pub fn format_empty_page(page: u32) -> String {
    format!("Page {}: no products found, skipping", page)
}

/// Rate limit for redraws. The final update (`done >= total`) always passes.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn ready(&mut self, now: Instant, done: usize, total: usize) -> bool {
        let due = self
            .last
            .map_or(true, |last| now.duration_since(last) >= self.interval);
        if due || done >= total {
            self.last = Some(now);
            return true;
        }
        false
    }
}

/// Redraw the current line on stdout.
pub fn redraw(line: &str) {
    print!("\r  {}  ", line);
    let _ = std::io::stdout().flush();
}
