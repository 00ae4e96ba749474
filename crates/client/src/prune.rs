//! Pruning a cache down to an externally supplied set of URLs.

use crate::fetch::canonicalize;
use crate::store::CacheStore;
use serde::{Deserialize, Serialize};
use shellcache_core::Error;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneReport {
    pub kept: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Build the set of URLs to keep.
///
/// URLs are canonicalized the same way intercepted requests are, so that
/// they compare equal to stored entry URLs. Strings that do not parse are
/// kept verbatim and simply match nothing.
pub fn keep_set<S: AsRef<str>>(urls: &[S]) -> HashSet<String> {
    urls.iter()
        .map(|url| {
            let url = url.as_ref();
            canonicalize(url).map_or_else(|_| url.to_string(), |u| u.to_string())
        })
        .collect()
}

/// Delete every entry of `cache_name` whose URL is not in `keep`.
///
/// Each deletion stands alone; failures are counted and logged and do not
/// stop the rest. Entries in `keep` are left untouched.
pub async fn prune<S: CacheStore + ?Sized>(
    db: &S, cache_name: &str, keep: &HashSet<String>,
) -> Result<PruneReport, Error> {
    let mut report = PruneReport::default();

    for entry in db.keys(cache_name).await? {
        if keep.contains(&entry.url) {
            report.kept += 1;
            continue;
        }
        match db.delete_entry(cache_name, &entry.key).await {
            Ok(_) => report.deleted += 1,
            Err(e) => {
                tracing::warn!("failed to prune {} from {}: {}", entry.url, cache_name, e);
                report.failed += 1;
            }
        }
    }

    tracing::debug!(
        cache = %cache_name,
        kept = report.kept,
        deleted = report.deleted,
        failed = report.failed,
        "pruned cache"
    );

    Ok(report)
}
