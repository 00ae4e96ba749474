//! cache_keys tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::{CacheDb, EntryKey, Error};

use crate::tools::json_result;

/// Parameters for the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysParams {
    /// Cache name, e.g. "static-1.0" or "giphy".
    pub cache: String,
}

/// Output from the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysOutput {
    pub cache: String,
    pub entries: Vec<EntryKey>,
}

/// Implementation of the cache_keys tool.
pub async fn keys_impl(cache: &CacheDb, params: CacheKeysParams) -> Result<CallToolResult, McpError> {
    if !cache.has_cache(&params.cache).await? {
        return Err(Error::CacheMiss(format!("no cache named {}", params.cache)).into());
    }

    let entries = cache.keys(&params.cache).await?;
    json_result(&CacheKeysOutput { cache: params.cache, entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::output;
    use shellcache_core::{CacheRequest, ResponseSnapshot};

    #[tokio::test]
    async fn test_keys_missing_cache() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let result = keys_impl(&cache, CacheKeysParams { cache: "giphy".into() }).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_keys_lists_urls() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let url = url::Url::parse("http://localhost:8080/index.html").unwrap();
        cache
            .put("static-1.0", &CacheRequest::get(url.clone()), &ResponseSnapshot::new(url.as_str(), 200, "<html>"))
            .await
            .unwrap();

        let out: CacheKeysOutput = output(&keys_impl(&cache, CacheKeysParams { cache: "static-1.0".into() }).await.unwrap());
        assert_eq!(out.cache, "static-1.0");
        assert_eq!(out.entries.len(), 1);
        assert_eq!(out.entries[0].url, "http://localhost:8080/index.html");
        assert_eq!(out.entries[0].method, "GET");
    }
}
