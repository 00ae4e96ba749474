//! Intercepted request identity.

use crate::cache::hash::compute_cache_key;
use url::Url;

/// A request handed to the worker by the host.
///
/// Only the parts that matter for routing and cache identity are kept:
/// method, URL (fragment stripped) and headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRequest {
    pub method: String,
    pub url: Url,
    pub headers: Vec<(String, String)>,
}

impl CacheRequest {
    /// Create a request with the given method. The method is uppercased.
    pub fn new(method: &str, mut url: Url) -> Self {
        url.set_fragment(None);
        Self { method: method.to_ascii_uppercase(), url, headers: Vec::new() }
    }

    /// Create a GET request.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    /// Add a header, keeping insertion order.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Cache key for this request. Independent of header order and object identity.
    pub fn cache_key(&self) -> String {
        compute_cache_key(&self.method, self.url.as_str())
    }
}
