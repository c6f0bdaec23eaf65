//! Image fetcher: product id → detail JSON → main image URL → file on disk.
//!
//! One attempt per product, no retries. The image body is fully buffered
//! before anything touches the filesystem, so a failed product never leaves
//! a file behind.

mod save;

pub use save::{ensure_output_dir, image_file_name, save_image};

use crate::catalog::ProductId;
use crate::config::CatalogConfig;
use crate::error::{ErrorKind, FetchError};
use crate::http::HttpClient;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// One completed download: where the image came from and where it landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub product_id: ProductId,
    pub source_url: String,
    pub path: PathBuf,
}

/// Result of handling one product inside the worker pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductOutcome {
    Saved(ImageRecord),
    Failed { product_id: ProductId, kind: ErrorKind },
}

impl ProductOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, ProductOutcome::Saved(_))
    }
}

/// Detail URL for `id` (substitutes `{id}`).
pub fn detail_url(template: &str, id: u64) -> String {
    template.replace("{id}", &id.to_string())
}

/// Extract `data.product.images.main.url[0]`.
pub fn parse_main_image_url(doc: &Value) -> Result<String, FetchError> {
    doc.pointer("/data/product/images/main/url/0")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(FetchError::Shape("data.product.images.main.url[0]"))
}

/// Resolve the main image of `product_id` and save it under `output_dir`.
pub fn fetch_product_image(
    client: &HttpClient,
    catalog: &CatalogConfig,
    output_dir: &Path,
    product_id: ProductId,
) -> Result<ImageRecord, FetchError> {
    let doc = client.get_json(&detail_url(&catalog.detail_url, product_id.0))?;
    let source_url = parse_main_image_url(&doc)?;
    let bytes = client.get_bytes(&source_url)?;
    ensure_output_dir(output_dir)?;
    let path = save_image(output_dir, &bytes)?;
    tracing::debug!(product = %product_id, path = %path.display(), bytes = bytes.len(), "image saved");
    Ok(ImageRecord {
        product_id,
        source_url,
        path,
    })
}

/// Like [`fetch_product_image`], but never fails: errors are logged once with
/// the product id and returned as `ProductOutcome::Failed`.
pub fn leech_product(
    client: &HttpClient,
    catalog: &CatalogConfig,
    output_dir: &Path,
    product_id: ProductId,
) -> ProductOutcome {
    match fetch_product_image(client, catalog, output_dir, product_id) {
        Ok(record) => ProductOutcome::Saved(record),
        Err(e) => {
            let kind = e.kind();
            tracing::warn!(product = %product_id, %kind, "error processing product {}: {}", product_id, e);
            ProductOutcome::Failed { product_id, kind }
        }
    }
}
