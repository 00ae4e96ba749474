//! Install and activate.
//!
//! Install seeds the current shell generation with every app-shell asset;
//! activate deletes the shell generations left behind by earlier versions.

use crate::fetch::{Network, resolve};
use crate::store::CacheStore;
use crate::strategy::StrategyContext;
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use shellcache_core::{AppConfig, CacheRequest, Error, ResponseSnapshot};
use url::Url;

/// A versioned namespace, stored as the generation `<namespace>-<version>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellNamespace {
    pub namespace: String,
    pub version: String,
}

impl ShellNamespace {
    pub fn new(namespace: impl Into<String>, version: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), version: version.into() }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.shell_namespace.clone(), config.version.clone())
    }

    pub fn cache_name(&self) -> String {
        format!("{}-{}", self.namespace, self.version)
    }

    /// Whether `name` is an older or newer generation of this namespace.
    pub fn is_stale(&self, name: &str) -> bool {
        name.strip_prefix(self.namespace.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
            .is_some_and(|version| version != self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    pub cache: String,
    pub seeded: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcReport {
    pub current: String,
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
}

/// Fetch every asset and store them all in the shell generation.
///
/// All or nothing: if any asset fails to fetch or answers with a non-2xx
/// status, nothing is written and `Error::SeedFailed` is returned. Seeding the
/// same version again overwrites the same keys.
pub async fn seed(
    ctx: &StrategyContext, shell: &ShellNamespace, base: &Url, assets: &[String],
) -> Result<SeedReport, Error> {
    let cache = shell.cache_name();

    let requests = assets
        .iter()
        .map(|asset| resolve(base, asset).map(CacheRequest::get))
        .collect::<Result<Vec<_>, _>>()?;

    let responses = try_join_all(requests.iter().map(|request| fetch_asset(ctx.network.as_ref(), request))).await?;

    let entries: Vec<_> = requests.into_iter().zip(responses).collect();
    ctx.db.put_all(&cache, &entries).await?;

    tracing::info!(cache = %cache, assets = entries.len(), "seeded shell cache");

    Ok(SeedReport { cache, seeded: entries.len() })
}

async fn fetch_asset(network: &dyn Network, request: &CacheRequest) -> Result<ResponseSnapshot, Error> {
    let response = network
        .fetch(request)
        .await
        .map_err(|e| Error::SeedFailed { url: request.url.to_string(), reason: e.to_string() })?;

    if !response.is_ok() {
        return Err(Error::SeedFailed { url: request.url.to_string(), reason: format!("status {}", response.status) });
    }

    Ok(response)
}

/// Delete every generation of the shell namespace except the current one.
///
/// Each deletion stands alone; a failure is recorded in the report and the
/// remaining generations are still processed. Caches outside the namespace
/// are never touched.
pub async fn collect_garbage<S: CacheStore + ?Sized>(db: &S, shell: &ShellNamespace) -> Result<GcReport, Error> {
    let mut report = GcReport { current: shell.cache_name(), ..Default::default() };

    for name in db.cache_names().await? {
        if !shell.is_stale(&name) {
            continue;
        }
        match db.delete_cache(&name).await {
            Ok(_) => {
                tracing::info!("deleted stale cache generation {}", name);
                report.deleted.push(name);
            }
            Err(e) => {
                tracing::warn!("failed to delete cache generation {}: {}", name, e);
                report.failed.push(name);
            }
        }
    }

    Ok(report)
}
