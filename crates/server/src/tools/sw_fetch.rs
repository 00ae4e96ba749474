//! sw_fetch tool implementation.
//!
//! Hands one request to the worker as if the page had made it.

use std::collections::BTreeMap;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_client::{Worker, fetch::canonicalize};
use shellcache_core::{CacheRequest, Error};

use super::json_result;

/// Parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute http(s) URL of the request.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default)]
    pub method: Option<String>,

    /// Request headers.
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
}

/// Output from the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    /// How the request was routed: cache_first(shell), cache_first(media), network_first or passthrough.
    pub route: String,
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    /// "utf8" or "base64".
    pub body_encoding: String,
    pub body: String,
    pub bytes: usize,
}

/// Implementation of the sw_fetch tool.
///
/// A network-first request that finds neither a live response nor a cached
/// one is reported as `CACHE_MISS`.
pub async fn fetch_impl(worker: &Worker, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    let url = canonicalize(&params.url).map_err(Error::from)?;
    let method = params.method.as_deref().unwrap_or("GET");
    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(Error::InvalidInput(format!("invalid method: {method}")).into());
    }

    let mut request = CacheRequest::new(method, url);
    for (name, value) in params.headers.unwrap_or_default() {
        request = request.with_header(name, value);
    }

    let intercepted = worker.fetch(&request).await?;
    let response = intercepted
        .response
        .ok_or_else(|| Error::CacheMiss(request.url.to_string()))?;

    let (body_encoding, body) = match std::str::from_utf8(&response.body) {
        Ok(text) => ("utf8", text.to_string()),
        Err(_) => ("base64", STANDARD.encode(&response.body)),
    };

    json_result(&SwFetchOutput {
        route: intercepted.route.to_string(),
        url: response.url,
        status: response.status,
        status_text: response.status_text,
        headers: response.headers,
        body_encoding: body_encoding.to_string(),
        body,
        bytes: response.body.len(),
    })
}
