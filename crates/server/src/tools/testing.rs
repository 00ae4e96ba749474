//! In-process worker fixtures for tool tests.

use async_trait::async_trait;
use rmcp::model::CallToolResult;
use serde::de::DeserializeOwned;
use shellcache_client::{Network, Worker};
use shellcache_core::{AppConfig, CacheDb, CacheRequest, Error, ResponseSnapshot};
use std::collections::HashMap;
use std::sync::Arc;

/// Serves a fixed set of URLs with status 200; everything else is offline.
pub(crate) struct StubNetwork {
    pages: HashMap<String, &'static str>,
}

#[async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &CacheRequest) -> Result<ResponseSnapshot, Error> {
        let url = request.url.to_string();
        match self.pages.get(&url) {
            Some(body) => Ok(ResponseSnapshot::new(url, 200, *body).with_header("content-type", "text/plain")),
            None => Err(Error::Network(format!("offline: {url}"))),
        }
    }
}

pub(crate) async fn worker(pages: &[(&str, &'static str)]) -> Arc<Worker> {
    let db = CacheDb::open_in_memory().await.unwrap();
    let network = Arc::new(StubNetwork { pages: pages.iter().map(|(u, b)| (u.to_string(), *b)).collect() });
    let config = AppConfig { shell_assets: vec!["index.html".into(), "main.js".into()], ..Default::default() };
    Arc::new(Worker::new(db, network, &config).unwrap())
}

pub(crate) fn output<T: DeserializeOwned>(result: &CallToolResult) -> T {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
