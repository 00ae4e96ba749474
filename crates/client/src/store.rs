//! The slice of the cache store that garbage collection and pruning use.
//!
//! Both walk a listing and delete item by item, so [`CacheStore`] only
//! exposes enumeration and single deletes. [`CacheDb`] is the production
//! implementation.

use async_trait::async_trait;
use shellcache_core::{CacheDb, EntryKey, Error};

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Generation names in creation order.
    async fn cache_names(&self) -> Result<Vec<String>, Error>;

    /// Delete a whole generation. Returns whether it existed.
    async fn delete_cache(&self, name: &str) -> Result<bool, Error>;

    /// Entries of one generation.
    async fn keys(&self, cache_name: &str) -> Result<Vec<EntryKey>, Error>;

    /// Delete one entry by cache key. Returns whether it existed.
    async fn delete_entry(&self, cache_name: &str, key: &str) -> Result<bool, Error>;
}

#[async_trait]
impl CacheStore for CacheDb {
    async fn cache_names(&self) -> Result<Vec<String>, Error> {
        CacheDb::cache_names(self).await
    }

    async fn delete_cache(&self, name: &str) -> Result<bool, Error> {
        CacheDb::delete_cache(self, name).await
    }

    async fn keys(&self, cache_name: &str) -> Result<Vec<EntryKey>, Error> {
        CacheDb::keys(self, cache_name).await
    }

    async fn delete_entry(&self, cache_name: &str, key: &str) -> Result<bool, Error> {
        CacheDb::delete_entry(self, cache_name, key).await
    }
}
