//! Catalog walker: one listing request per page, yielding product ids.
//!
//! Pages come from a fixed configured range, so the walker never has to find
//! the last page. Any failure for a page is logged and reported as an empty
//! page; the caller simply moves on to the next page number.

use crate::config::CatalogConfig;
use crate::error::FetchError;
use crate::http::HttpClient;
use serde_json::Value;
use std::fmt;

/// Opaque positive catalog item identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Listing URL for `page` (substitutes `{page}`; everything else is literal).
pub fn listing_url(template: &str, page: u32) -> String {
    template.replace("{page}", &page.to_string())
}

/// Extract `data.products[].id` in listing order.
///
/// Products without a positive integer `id` are skipped; a missing or
/// non-array `data.products` is a shape error.
pub fn parse_product_ids(doc: &Value) -> Result<Vec<ProductId>, FetchError> {
    let products = doc
        .pointer("/data/products")
        .and_then(Value::as_array)
        .ok_or(FetchError::Shape("data.products"))?;

    let mut ids = Vec::with_capacity(products.len());
    for (index, product) in products.iter().enumerate() {
        match product.get("id").and_then(Value::as_u64) {
            Some(id) if id > 0 => ids.push(ProductId(id)),
            _ => tracing::debug!(index, "listing entry without a usable id, skipped"),
        }
    }
    Ok(ids)
}

/// Fetch one listing page and parse its product ids.
pub fn fetch_page(
    client: &HttpClient,
    catalog: &CatalogConfig,
    page: u32,
) -> Result<Vec<ProductId>, FetchError> {
    let url = listing_url(&catalog.listing_url, page);
    tracing::debug!(page, %url, "requesting listing");
    let doc = client.get_json(&url)?;
    parse_product_ids(&doc)
}

/// Product ids for `page`, or an empty list if the page could not be fetched
/// or parsed. Emits one warning per failed page.
pub fn product_ids_for_page(
    client: &HttpClient,
    catalog: &CatalogConfig,
    page: u32,
) -> Vec<ProductId> {
    match fetch_page(client, catalog, page) {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(page, kind = %e.kind(), "error fetching products for page {}: {}", page, e);
            Vec::new()
        }
    }
}
