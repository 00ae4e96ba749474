//! Network access for the worker.
//!
//! [`Network`] is the seam between the caching strategies and the outside
//! world; [`FetchClient`] is the reqwest-backed implementation used in
//! production.
//!
//! The client reports every HTTP status as a response. Deciding whether a
//! 404 is a failure is up to the strategy; only transport-level failures
//! (DNS, connect, TLS, reading the body) become errors.

pub mod url;

use async_trait::async_trait;
use reqwest::{Client, header};
use shellcache_core::{AppConfig, CacheRequest, Error, ResponseSnapshot};
use std::time::{Duration, Instant};

pub use url::{UrlError, canonicalize, resolve};

/// Source of live responses.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request and read the full body.
    ///
    /// Returns `Error::Network` when no response was received at all.
    async fn fetch(&self, request: &CacheRequest) -> Result<ResponseSnapshot, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "shellcache/0.1")
    pub user_agent: String,

    /// Request timeout (default: none, a hung request waits forever)
    pub timeout: Option<Duration>,

    /// Maximum number of redirects to follow (default: 20)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "shellcache/0.1".to_string(), timeout: None, max_redirects: 20 }
    }
}

impl FetchConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), ..Default::default() }
    }
}

/// HTTP client that turns requests into response snapshots.
pub struct FetchClient {
    http: Client,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &CacheRequest) -> Result<ResponseSnapshot, Error> {
        let start = Instant::now();

        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method {}: {e}", request.method)))?;

        let mut builder = self.http.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("{} {}: {e}", request.method, request.url)))?;

        let status = response.status();
        let final_url = response.url().to_string();
        let headers = collect_headers(response.headers());

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read {}: {e}", request.url)))?;

        tracing::debug!(
            "fetched {} {} -> {} in {}ms ({} bytes)",
            request.method,
            request.url,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(ResponseSnapshot {
            url: final_url,
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn collect_headers(headers: &header::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
        .collect()
}
