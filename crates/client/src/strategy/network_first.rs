use super::StrategyContext;
use shellcache_core::{CacheRequest, Error, ResponseSnapshot};

/// Network first, cache fallback.
///
/// A 2xx response is returned and a copy written to `cache_name` in the
/// background. A non-2xx response or a network error falls back to a lookup
/// across every cache; `Ok(None)` means both sources came up empty.
pub async fn network_first(
    ctx: &StrategyContext, request: &CacheRequest, cache_name: &str,
) -> Result<Option<ResponseSnapshot>, Error> {
    match ctx.network.fetch(request).await {
        Ok(response) if response.is_ok() => {
            ctx.persist(cache_name, request, &response);
            return Ok(Some(response));
        }
        Ok(response) => {
            tracing::debug!("network returned {} for {}, trying cache", response.status, request.url);
        }
        Err(e) => {
            tracing::debug!("network failed for {}, trying cache: {}", request.url, e);
        }
    }

    ctx.db.match_any(&request.cache_key()).await
}
