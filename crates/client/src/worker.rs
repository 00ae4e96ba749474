//! The worker: lifecycle, fetch interception and control messages.
//!
//! A [`Worker`] is built once from [`AppConfig`] and shared by the host. All
//! of its entry points may run concurrently; the cache store is the only
//! shared state.

use crate::fetch::Network;
use crate::lifecycle::{self, GcReport, SeedReport, ShellNamespace};
use crate::message::ControlMessage;
use crate::prune::{keep_set, prune};
use crate::router::{CacheTarget, Route, Router};
use crate::strategy::{StrategyContext, cache_first, network_first};
use shellcache_core::{AppConfig, CacheDb, CacheRequest, Error, ResponseSnapshot};
use std::sync::Arc;
use url::Url;

/// Result of handing one request to the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intercepted {
    pub route: Route,
    /// `None` only for network-first requests where both network and cache failed.
    pub response: Option<ResponseSnapshot>,
}

pub struct Worker {
    ctx: StrategyContext,
    router: Router,
    shell: ShellNamespace,
    media_cache: String,
    origin: Url,
    shell_assets: Vec<String>,
}

impl Worker {
    pub fn new(db: CacheDb, network: Arc<dyn Network>, config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::Config(format!("origin: {e}")))?;

        Ok(Self {
            ctx: StrategyContext::new(db, network),
            router: Router::from_config(config)?,
            shell: ShellNamespace::from_config(config),
            media_cache: config.media_cache.clone(),
            origin,
            shell_assets: config.shell_assets.clone(),
        })
    }

    /// Seed the current shell generation.
    ///
    /// The host must not activate this worker if this fails.
    pub async fn install(&self) -> Result<SeedReport, Error> {
        tracing::info!(cache = %self.shell.cache_name(), "installing");
        lifecycle::seed(&self.ctx, &self.shell, &self.origin, &self.shell_assets).await
    }

    /// Delete stale shell generations.
    ///
    /// Refused with `Error::InvalidInput` while the current generation does
    /// not exist, so a failed or skipped install never costs the worker its
    /// last good shell.
    pub async fn activate(&self) -> Result<GcReport, Error> {
        let current = self.shell.cache_name();
        if !self.ctx.db.has_cache(&current).await? {
            tracing::warn!(cache = %current, "refusing to activate before a successful install");
            return Err(Error::InvalidInput(format!("cannot activate {current}: not installed")));
        }

        tracing::info!(cache = %current, "activating");
        lifecycle::collect_garbage(&self.ctx.db, &self.shell).await
    }

    /// Serve one intercepted request.
    ///
    /// Requests no rule claims are fetched from the network unchanged.
    pub async fn fetch(&self, request: &CacheRequest) -> Result<Intercepted, Error> {
        let route = self.router.classify(&request.url);
        tracing::debug!("routing {} {} via {}", request.method, request.url, route);

        let response = match route {
            Route::CacheFirst(target) => Some(cache_first(&self.ctx, request, &self.cache_for(target)).await?),
            Route::NetworkFirst => network_first(&self.ctx, request, &self.shell.cache_name()).await?,
            Route::Passthrough => Some(self.ctx.network.fetch(request).await?),
        };

        Ok(Intercepted { route, response })
    }

    /// Handle a control message from the host page.
    ///
    /// Recognized messages start their work in the background and return
    /// immediately. Returns whether the message was recognized; unrecognized
    /// messages are otherwise ignored.
    pub fn handle_message(&self, message: &serde_json::Value) -> bool {
        let Some(message) = ControlMessage::parse(message) else {
            tracing::debug!("ignoring unrecognized control message");
            return false;
        };

        match message {
            ControlMessage::CleanGiphyCache { giphys } => {
                let keep = keep_set(giphys.as_slice());
                let db = self.ctx.db.clone();
                let cache = self.media_cache.clone();
                self.ctx.background.spawn(async move {
                    if let Err(e) = prune(&db, &cache, &keep).await {
                        tracing::warn!("failed to prune {}: {}", cache, e);
                    }
                });
            }
        }

        true
    }

    /// Wait for background cache writes and prunes to finish.
    pub async fn flush(&self) {
        self.ctx.background.flush().await;
    }

    pub fn db(&self) -> &CacheDb {
        &self.ctx.db
    }

    fn cache_for(&self, target: CacheTarget) -> String {
        match target {
            CacheTarget::Shell => self.shell.cache_name(),
            CacheTarget::Media => self.media_cache.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedNetwork, get};
    use serde_json::json;

    const TRENDING: &str = "https://api.giphy.com/v1/gifs/trending?api_key=k";
    const GIF_X: &str = "https://media.giphy.com/media/x/giphy.gif";
    const GIF_Y: &str = "https://media.giphy.com/media/y/giphy.gif";
    const GIF_Z: &str = "https://media.giphy.com/media/z/giphy.gif";

    fn config(version: &str) -> AppConfig {
        AppConfig {
            version: version.into(),
            shell_assets: vec!["a.html".into(), "b.js".into()],
            ..Default::default()
        }
    }

    fn shell_network() -> Arc<ScriptedNetwork> {
        let network = Arc::new(ScriptedNetwork::new());
        network.respond("http://localhost:8080/a.html", 200, "<html>");
        network.respond("http://localhost:8080/b.js", 200, "js");
        network
    }

    async fn urls_in(db: &CacheDb, cache: &str) -> Vec<String> {
        db.keys(cache).await.unwrap().into_iter().map(|k| k.url).collect()
    }

    #[tokio::test]
    async fn test_version_bump_scenario() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = shell_network();

        let v1 = Worker::new(db.clone(), network.clone(), &config("1.0")).unwrap();
        v1.install().await.unwrap();
        v1.activate().await.unwrap();
        assert_eq!(
            urls_in(&db, "static-1.0").await,
            vec!["http://localhost:8080/a.html", "http://localhost:8080/b.js"]
        );

        let v2 = Worker::new(db.clone(), network, &config("2.0")).unwrap();
        v2.install().await.unwrap();
        assert_eq!(db.cache_names().await.unwrap(), vec!["static-1.0", "static-2.0"]);

        let report = v2.activate().await.unwrap();
        assert_eq!(report.deleted, vec!["static-1.0"]);
        assert_eq!(db.cache_names().await.unwrap(), vec!["static-2.0"]);
    }

    #[tokio::test]
    async fn test_failed_install_leaves_previous_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let v1 = Worker::new(db.clone(), shell_network(), &config("1.0")).unwrap();
        v1.install().await.unwrap();

        let broken = Arc::new(ScriptedNetwork::new());
        broken.respond("http://localhost:8080/a.html", 200, "<html>");
        let v2 = Worker::new(db.clone(), broken, &config("2.0")).unwrap();

        assert!(matches!(v2.install().await, Err(Error::SeedFailed { .. })));
        assert_eq!(db.cache_names().await.unwrap(), vec!["static-1.0"]);
    }

    #[tokio::test]
    async fn test_activate_refused_after_failed_install() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let v1 = Worker::new(db.clone(), shell_network(), &config("1.0")).unwrap();
        v1.install().await.unwrap();
        v1.activate().await.unwrap();

        let v2 = Worker::new(db.clone(), Arc::new(ScriptedNetwork::new()), &config("2.0")).unwrap();
        assert!(v2.install().await.is_err());

        assert!(matches!(v2.activate().await, Err(Error::InvalidInput(_))));
        assert_eq!(db.cache_names().await.unwrap(), vec!["static-1.0"]);
    }

    #[tokio::test]
    async fn test_activate_refused_without_install() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_cache("static-0.9").await.unwrap();
        let worker = Worker::new(db.clone(), shell_network(), &config("1.0")).unwrap();

        assert!(worker.activate().await.is_err());
        assert_eq!(db.cache_names().await.unwrap(), vec!["static-0.9"]);
    }

    #[tokio::test]
    async fn test_requests_before_activate_see_prior_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = shell_network();
        Worker::new(db.clone(), network.clone(), &config("1.0")).unwrap().install().await.unwrap();

        let v2 = Worker::new(db.clone(), network.clone(), &config("2.0")).unwrap();
        let calls = network.calls();

        let served = v2.fetch(&get("http://localhost:8080/a.html")).await.unwrap();

        assert_eq!(served.route, Route::CacheFirst(CacheTarget::Shell));
        assert_eq!(served.response.unwrap().body, "<html>");
        assert_eq!(network.calls(), calls);
    }

    #[tokio::test]
    async fn test_shell_miss_is_stored_in_current_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = shell_network();
        network.respond("http://localhost:8080/late.css", 200, "body{}");
        let worker = Worker::new(db.clone(), network.clone(), &config("1.0")).unwrap();

        let served = worker.fetch(&get("http://localhost:8080/late.css")).await.unwrap();
        assert_eq!(served.response.unwrap().body, "body{}");
        assert_eq!(network.calls_to("http://localhost:8080/late.css"), 1);

        worker.flush().await;
        assert_eq!(urls_in(&db, "static-1.0").await, vec!["http://localhost:8080/late.css"]);
    }

    #[tokio::test]
    async fn test_trending_falls_back_to_cached_feed() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = Arc::new(ScriptedNetwork::new());
        network.respond(TRENDING, 200, "feed v1");
        let worker = Worker::new(db.clone(), network.clone(), &config("1.0")).unwrap();

        let first = worker.fetch(&get(TRENDING)).await.unwrap();
        assert_eq!(first.route, Route::NetworkFirst);
        worker.flush().await;

        network.respond(TRENDING, 500, "error");
        let second = worker.fetch(&get(TRENDING)).await.unwrap();
        assert_eq!(second.response.unwrap().body, "feed v1");
    }

    #[tokio::test]
    async fn test_trending_final_miss() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let worker = Worker::new(db, Arc::new(ScriptedNetwork::new()), &config("1.0")).unwrap();

        let served = worker.fetch(&get(TRENDING)).await.unwrap();
        assert_eq!(served.route, Route::NetworkFirst);
        assert!(served.response.is_none());
    }

    #[tokio::test]
    async fn test_media_goes_to_media_cache() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = Arc::new(ScriptedNetwork::new());
        network.respond(GIF_X, 200, "gif");
        let worker = Worker::new(db.clone(), network, &config("1.0")).unwrap();

        let served = worker.fetch(&get(GIF_X)).await.unwrap();
        assert_eq!(served.route, Route::CacheFirst(CacheTarget::Media));
        worker.flush().await;

        assert_eq!(urls_in(&db, "giphy").await, vec![GIF_X]);
        assert!(!db.has_cache("static-1.0").await.unwrap());
    }

    #[tokio::test]
    async fn test_passthrough_is_not_cached() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = Arc::new(ScriptedNetwork::new());
        network.respond("https://fonts.example.com/font.woff2", 200, "font");
        let worker = Worker::new(db.clone(), network.clone(), &config("1.0")).unwrap();

        let served = worker.fetch(&get("https://fonts.example.com/font.woff2")).await.unwrap();
        assert_eq!(served.route, Route::Passthrough);
        assert_eq!(served.response.unwrap().body, "font");
        worker.flush().await;

        assert!(db.cache_names().await.unwrap().is_empty());
        assert!(worker.fetch(&get("https://fonts.example.com/other.woff2")).await.is_err());
    }

    #[tokio::test]
    async fn test_clean_message_prunes_media_cache() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = Arc::new(ScriptedNetwork::new());
        for gif in [GIF_X, GIF_Y, GIF_Z] {
            network.respond(gif, 200, "gif");
        }
        let worker = Worker::new(db.clone(), network, &config("1.0")).unwrap();
        for gif in [GIF_X, GIF_Y, GIF_Z] {
            worker.fetch(&get(gif)).await.unwrap();
        }
        worker.flush().await;

        assert!(worker.handle_message(&json!({"action": "cleanGiphyCache", "giphys": [GIF_Y, GIF_Z]})));
        worker.flush().await;

        assert_eq!(urls_in(&db, "giphy").await, vec![GIF_Y, GIF_Z]);
    }

    #[tokio::test]
    async fn test_unrecognized_message_ignored() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let worker = Worker::new(db, Arc::new(ScriptedNetwork::new()), &config("1.0")).unwrap();

        assert!(!worker.handle_message(&json!({"action": "somethingElse"})));
        assert!(!worker.handle_message(&json!(42)));
        worker.flush().await;
    }
}
