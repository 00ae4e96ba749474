//! Caching strategies.
//!
//! - [`cache_first`]: serve from any cache, populate the target cache on a miss.
//! - [`network_first`]: serve live responses, degrade to any cache on failure.
//!
//! Both write to the cache in the background and hand the caller its own
//! copy of the response without waiting for the write.

mod cache_first;
mod network_first;

pub use cache_first::cache_first;
pub use network_first::network_first;

use crate::background::Background;
use crate::fetch::Network;
use shellcache_core::{CacheDb, CacheRequest, ResponseSnapshot};
use std::sync::Arc;

/// Everything a strategy needs: the store, the network, and somewhere to run writes.
#[derive(Clone)]
pub struct StrategyContext {
    pub db: CacheDb,
    pub network: Arc<dyn Network>,
    pub background: Background,
}

impl StrategyContext {
    pub fn new(db: CacheDb, network: Arc<dyn Network>) -> Self {
        Self { db, network, background: Background::new() }
    }

    /// Store a copy of `response` under `request` in `cache_name` without blocking.
    ///
    /// Failures are logged and otherwise ignored.
    pub(crate) fn persist(&self, cache_name: &str, request: &CacheRequest, response: &ResponseSnapshot) {
        let db = self.db.clone();
        let cache_name = cache_name.to_string();
        let request = request.clone();
        let response = response.clone();

        self.background.spawn(async move {
            if let Err(e) = db.put(&cache_name, &request, &response).await {
                tracing::warn!("failed to cache {} in {}: {}", request.url, cache_name, e);
            }
        });
    }
}
