//! Blocking HTTP GET transport.
//!
//! Uses the curl crate (libcurl). One `Easy` handle per request, so a single
//! `HttpClient` can be shared by reference across worker threads. Every
//! request carries the configured browser-style headers and buffers the
//! whole body before returning.

use crate::config::HttpConfig;
use crate::error::FetchError;
use std::time::Duration;

/// Request options derived from the `[http]` config section.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub verify_tls: bool,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub user_agent: String,
    pub accept_encoding: String,
    /// Extra headers sent verbatim ("Name: value").
    pub headers: Vec<String>,
}

impl From<&HttpConfig> for HttpOptions {
    fn from(cfg: &HttpConfig) -> Self {
        Self {
            verify_tls: cfg.verify_tls,
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            user_agent: cfg.user_agent.clone(),
            accept_encoding: cfg.accept_encoding.clone(),
            headers: vec![
                format!("Accept: {}", cfg.accept.trim()),
                format!("Accept-Language: {}", cfg.accept_language.trim()),
            ],
        }
    }
}

/// Shared, stateless HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    opts: HttpOptions,
}

impl HttpClient {
    pub fn new(opts: HttpOptions) -> Self {
        if !opts.verify_tls {
            tracing::warn!("TLS certificate verification is DISABLED for all requests");
        }
        Self { opts }
    }

    pub fn from_config(cfg: &HttpConfig) -> Self {
        Self::new(HttpOptions::from(cfg))
    }

    pub fn options(&self) -> &HttpOptions {
        &self.opts
    }

    /// GET `url` and return the full response body.
    ///
    /// Follows redirects. Fails with `Status` on any non-2xx final response,
    /// and with `Transport` on curl errors including timeouts. Runs in the
    /// current thread; call from `spawn_blocking` if used from async code.
    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.opts.connect_timeout)?;
        easy.timeout(self.opts.timeout)?;
        easy.useragent(&self.opts.user_agent)?;
        if !self.opts.accept_encoding.is_empty() {
            easy.accept_encoding(&self.opts.accept_encoding)?;
        }
        if !self.opts.verify_tls {
            easy.ssl_verify_peer(false)?;
            easy.ssl_verify_host(false)?;
        }

        let mut list = curl::easy::List::new();
        for h in &self.opts.headers {
            list.append(h)?;
        }
        if !self.opts.headers.is_empty() {
            easy.http_headers(list)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Status(code));
        }
        Ok(body)
    }

    /// GET `url` and decode the body as JSON.
    pub fn get_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        let body = self.get_bytes(url)?;
        Ok(serde_json::from_slice(&body)?)
    }
}
