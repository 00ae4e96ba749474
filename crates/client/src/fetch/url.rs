//! URL canonicalization for request identity and shell asset resolution.

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<UrlError> for shellcache_core::Error {
    fn from(err: UrlError) -> Self {
        shellcache_core::Error::InvalidUrl(err.to_string())
    }
}

/// Canonicalize an absolute URL string handed in by the host.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Require an http(s) scheme
/// 3. Lowercase the host (done by the parser)
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    check_scheme(&parsed)?;
    parsed.set_fragment(None);

    Ok(parsed)
}

/// Resolve a shell asset path against the worker origin.
///
/// Relative paths (`images/logo.png`) resolve against `base`; absolute URLs
/// are kept as they are.
pub fn resolve(base: &url::Url, asset: &str) -> Result<url::Url, UrlError> {
    let trimmed = asset.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut resolved = base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    check_scheme(&resolved)?;
    resolved.set_fragment(None);

    Ok(resolved)
}

fn check_scheme(url: &url::Url) -> Result<(), UrlError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }
}
