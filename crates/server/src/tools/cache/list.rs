//! cache_list tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::{CacheDb, cache::CacheSummary};

use crate::tools::json_result;

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    /// Generations in creation order.
    pub caches: Vec<CacheSummary>,
}

/// Implementation of the cache_list tool.
pub async fn list_impl(cache: &CacheDb) -> Result<CallToolResult, McpError> {
    let caches = cache.cache_summaries().await?;
    json_result(&CacheListOutput { caches })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::output;
    use shellcache_core::{CacheRequest, ResponseSnapshot};

    #[tokio::test]
    async fn test_list_empty() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let out: CacheListOutput = output(&list_impl(&cache).await.unwrap());
        assert!(out.caches.is_empty());
    }

    #[tokio::test]
    async fn test_list_counts_entries() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        cache.open_cache("static-1.0").await.unwrap();
        let url = url::Url::parse("https://media.giphy.com/media/x/giphy.gif").unwrap();
        cache
            .put("giphy", &CacheRequest::get(url.clone()), &ResponseSnapshot::new(url.as_str(), 200, "gif"))
            .await
            .unwrap();

        let out: CacheListOutput = output(&list_impl(&cache).await.unwrap());
        let counts: Vec<_> = out.caches.iter().map(|c| (c.name.as_str(), c.entries)).collect();
        assert_eq!(counts, vec![("static-1.0", 0), ("giphy", 1)]);
    }
}
