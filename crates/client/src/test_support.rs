//! Scripted network and store doubles for strategy and worker tests.

use crate::fetch::Network;
use crate::store::CacheStore;
use async_trait::async_trait;
use shellcache_core::{CacheDb, CacheRequest, EntryKey, Error, ResponseSnapshot};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use url::Url;

/// Responds from a fixed table; anything not in the table behaves as offline.
#[derive(Default)]
pub(crate) struct ScriptedNetwork {
    routes: Mutex<HashMap<String, Option<(u16, &'static str)>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, url: &str, status: u16, body: &'static str) {
        self.routes.lock().unwrap().insert(url.to_string(), Some((status, body)));
    }

    pub(crate) fn fail(&self, url: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), None);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &CacheRequest) -> Result<ResponseSnapshot, Error> {
        let url = request.url.to_string();
        self.calls.lock().unwrap().push(url.clone());

        match self.routes.lock().unwrap().get(&url).copied().flatten() {
            Some((status, body)) => Ok(ResponseSnapshot::new(url, status, body)),
            None => Err(Error::Network(format!("offline: {url}"))),
        }
    }
}

/// A real store whose deletes fail for chosen generation names or entry keys.
pub(crate) struct RefusingStore {
    db: CacheDb,
    refused: HashSet<String>,
}

impl RefusingStore {
    pub(crate) fn new(db: CacheDb, refused: &[&str]) -> Self {
        Self { db, refused: refused.iter().map(|s| s.to_string()).collect() }
    }

    fn refuse(&self, target: &str) -> Result<(), Error> {
        if self.refused.contains(target) {
            return Err(Error::InvalidInput(format!("delete refused: {target}")));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for RefusingStore {
    async fn cache_names(&self) -> Result<Vec<String>, Error> {
        self.db.cache_names().await
    }

    async fn delete_cache(&self, name: &str) -> Result<bool, Error> {
        self.refuse(name)?;
        self.db.delete_cache(name).await
    }

    async fn keys(&self, cache_name: &str) -> Result<Vec<EntryKey>, Error> {
        self.db.keys(cache_name).await
    }

    async fn delete_entry(&self, cache_name: &str, key: &str) -> Result<bool, Error> {
        self.refuse(key)?;
        self.db.delete_entry(cache_name, key).await
    }
}

pub(crate) fn get(url: &str) -> CacheRequest {
    CacheRequest::get(Url::parse(url).unwrap())
}
