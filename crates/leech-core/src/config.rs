use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::listing_url;
use crate::fetcher::detail_url;

/// Request shape shared by listing, detail and image requests (`[http]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Verify TLS certificates. Setting this to false disables both peer and
    /// host verification for every request and is logged as a warning.
    pub verify_tls: bool,
    /// Connection phase timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds. A timeout counts as a transport failure.
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    /// Passed to libcurl, which also decodes the matching response encodings.
    pub accept_encoding: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            verify_tls: true,
            connect_timeout_secs: 15,
            timeout_secs: 120,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
            accept_encoding: "gzip, deflate".to_string(),
        }
    }
}

/// Catalog endpoints and the page range to walk (`[catalog]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Listing endpoint; `{page}` is replaced by the page number. The rest of
    /// the query string is sent exactly as written.
    pub listing_url: String,
    /// Product detail endpoint; `{id}` is replaced by the product id.
    pub detail_url: String,
    /// First page to request (inclusive).
    pub first_page: u32,
    /// Last page to request (inclusive).
    pub last_page: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            listing_url: "https://api.digikala.com/v1/categories/kids-bodysuit/search/\
                          ?page={page}&sort22&seo_url=%2Fcategory-kids-bodysuit%2F%3Fpage%3D11%26sort%3D21"
                .to_string(),
            detail_url: "https://api.digikala.com/v2/product/{id}/".to_string(),
            first_page: 50,
            last_page: 100,
        }
    }
}

/// Image download settings (`[fetch]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Directory that receives `main-<timestamp>.jpg` files.
    pub output_dir: PathBuf,
    /// Worker pool width: maximum product fetches in flight for one page.
    pub workers: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("img"),
            workers: 10,
        }
    }
}

/// Size classifier settings (`[classify]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Directory of previously downloaded files. No default; must come from
    /// the config file or the command line.
    pub source_dir: Option<PathBuf>,
    /// Directory that receives accepted copies.
    pub dest_dir: PathBuf,
    /// Exclusive lower bound in KiB.
    pub min_kib: u64,
    /// Exclusive upper bound in KiB.
    pub max_kib: u64,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            source_dir: None,
            dest_dir: PathBuf::from("product"),
            min_kib: 70,
            max_kib: 90,
        }
    }
}

/// Global configuration loaded from `~/.config/leech/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeechConfig {
    pub http: HttpConfig,
    pub catalog: CatalogConfig,
    pub fetch: FetchConfig,
    pub classify: ClassifyConfig,
}

impl LeechConfig {
    /// Reject settings that would make any run meaningless or build unusable URLs.
    pub fn validate(&self) -> Result<()> {
        self.validate_crawl()?;
        self.validate_classify()
    }

    /// Check only the sections a crawl reads (`[catalog]` and `[fetch]`).
    pub fn validate_crawl(&self) -> Result<()> {
        let catalog = &self.catalog;
        if catalog.first_page > catalog.last_page {
            bail!(
                "empty page range: first_page {} > last_page {}",
                catalog.first_page,
                catalog.last_page
            );
        }
        if !catalog.listing_url.contains("{page}") {
            bail!("catalog.listing_url must contain a {{page}} placeholder");
        }
        if !catalog.detail_url.contains("{id}") {
            bail!("catalog.detail_url must contain an {{id}} placeholder");
        }
        url::Url::parse(&listing_url(&catalog.listing_url, catalog.first_page))
            .context("catalog.listing_url is not a valid URL")?;
        url::Url::parse(&detail_url(&catalog.detail_url, 1))
            .context("catalog.detail_url is not a valid URL")?;
        if self.fetch.workers == 0 {
            bail!("fetch.workers must be at least 1");
        }
        Ok(())
    }

    /// Check only the `[classify]` section.
    pub fn validate_classify(&self) -> Result<()> {
        if self.classify.min_kib >= self.classify.max_kib {
            bail!(
                "classify bounds are empty: min_kib {} >= max_kib {}",
                self.classify.min_kib,
                self.classify.max_kib
            );
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("leech")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<LeechConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = LeechConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Load configuration from an explicit file. Missing keys take their defaults.
pub fn load_from_path(path: &Path) -> Result<LeechConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: LeechConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
