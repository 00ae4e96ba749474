use super::StrategyContext;
use shellcache_core::{CacheRequest, Error, ResponseSnapshot};

/// Cache first, network fallback.
///
/// A hit in any cache is returned without touching the network. On a miss the
/// network response is returned whatever its status, and a copy is written to
/// `cache_name` in the background. A network error propagates.
pub async fn cache_first(
    ctx: &StrategyContext, request: &CacheRequest, cache_name: &str,
) -> Result<ResponseSnapshot, Error> {
    if let Some(cached) = ctx.db.match_any(&request.cache_key()).await? {
        tracing::debug!("cache hit for {}", request.url);
        return Ok(cached);
    }

    let response = ctx.network.fetch(request).await?;
    tracing::debug!("cache miss for {}, fetched {}", request.url, response.status);

    ctx.persist(cache_name, request, &response);

    Ok(response)
}
