//! Crawl driver: walk pages in order, fan each page's products out to the
//! worker pool, and wait for the page to drain before requesting the next.

use crate::catalog::{self, ProductId};
use crate::config::{CatalogConfig, FetchConfig};
use crate::error::ErrorKind;
use crate::fetcher::{self, ProductOutcome};
use crate::http::HttpClient;
use crate::pool::WorkerPool;
use tokio::sync::mpsc::Sender;

/// Progress of the page currently being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    pub page: u32,
    /// Products finished (saved or failed) so far on this page.
    pub done: usize,
    pub total: usize,
}

impl PageProgress {
    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.done as f64 / self.total as f64).min(1.0)
    }
}

/// Send one progress update. Intermediate updates use `try_send` and are
/// dropped when the channel is full; the final `done == total` update of a
/// page (and the zero-product update of an empty page) blocks until the
/// receiver has room, so the last line a consumer sees is always complete.
///
/// Blocking requires the caller to be off the async runtime (e.g. inside
/// `spawn_blocking`), which is where `run_crawl` runs.
fn publish(tx: &Sender<PageProgress>, progress: PageProgress) {
    if progress.done >= progress.total {
        if tx.blocking_send(progress).is_err() {
            tracing::debug!(page = progress.page, "progress receiver dropped");
        }
    } else {
        let _ = tx.try_send(progress);
    }
}

/// Totals for one crawl run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages_visited: u32,
    /// Pages that produced no products (including failed listings).
    pub empty_pages: u32,
    pub products_found: usize,
    pub images_saved: usize,
    pub failures: usize,
}

/// Fetch every product on one page through `pool`. Returns the outcomes in
/// completion order; returns only after all of them are done.
pub fn fetch_page_images(
    client: &HttpClient,
    catalog: &CatalogConfig,
    fetch: &FetchConfig,
    pool: &WorkerPool,
    page: u32,
    product_ids: Vec<ProductId>,
    progress_tx: Option<&Sender<PageProgress>>,
) -> Vec<ProductOutcome> {
    let output_dir = fetch.output_dir.as_path();
    let ids = product_ids.clone();
    pool.run(
        product_ids,
        |id| fetcher::leech_product(client, catalog, output_dir, id),
        |done, total| {
            if let Some(tx) = progress_tx {
                publish(tx, PageProgress { page, done, total });
            }
        },
    )
    .into_iter()
    .map(|res| {
        res.unwrap_or_else(|panicked| {
            let product_id = ids[panicked.index];
            tracing::error!(product = %product_id, "worker panicked while processing product {}: {}", product_id, panicked.message);
            ProductOutcome::Failed {
                product_id,
                kind: ErrorKind::Panicked,
            }
        })
    })
    .collect()
}

/// Walk `first_page..=last_page`, downloading the main image of every listed
/// product. Per-page and per-product failures are logged and skipped; the run
/// always completes.
///
/// An empty page is reported on `progress_tx` as `done == total == 0`. Call
/// this from a blocking thread when `progress_tx` is set.
pub fn run_crawl(
    client: &HttpClient,
    catalog: &CatalogConfig,
    fetch: &FetchConfig,
    progress_tx: Option<&Sender<PageProgress>>,
) -> CrawlSummary {
    let pool = WorkerPool::new(fetch.workers);
    let mut summary = CrawlSummary::default();
    tracing::info!(
        output_dir = %fetch.output_dir.display(),
        workers = pool.width(),
        first_page = catalog.first_page,
        last_page = catalog.last_page,
        "starting image download"
    );

    for page in catalog.first_page..=catalog.last_page {
        summary.pages_visited += 1;
        tracing::info!(page, "processing page");

        let product_ids = catalog::product_ids_for_page(client, catalog, page);
        if product_ids.is_empty() {
            tracing::info!(page, "no products found on page, skipping");
            summary.empty_pages += 1;
            if let Some(tx) = progress_tx {
                publish(
                    tx,
                    PageProgress {
                        page,
                        done: 0,
                        total: 0,
                    },
                );
            }
            continue;
        }
        tracing::info!(page, count = product_ids.len(), "found products");
        summary.products_found += product_ids.len();

        let outcomes = fetch_page_images(
            client,
            catalog,
            fetch,
            &pool,
            page,
            product_ids,
            progress_tx,
        );
        let saved = outcomes.iter().filter(|o| o.is_saved()).count();
        summary.images_saved += saved;
        summary.failures += outcomes.len() - saved;
        tracing::debug!(page, saved, failed = outcomes.len() - saved, "page done");
    }

    tracing::info!(
        pages = summary.pages_visited,
        saved = summary.images_saved,
        failed = summary.failures,
        "download completed"
    );
    summary
}
