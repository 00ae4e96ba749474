//! Request classification.
//!
//! An ordered list of `(matcher, route)` rules; the first matching rule wins
//! and a URL matching none of them is passed through untouched:
//!
//! 1. same origin as the worker → cache first, shell cache
//! 2. trending feed pattern → network first
//! 3. media hosting pattern → cache first, media cache
//!
//! Classification looks only at the URL and keeps no state between requests.

use regex::Regex;
use serde::{Deserialize, Serialize};
use shellcache_core::{AppConfig, Error};
use std::fmt;
use url::{Origin, Url};

/// Which named cache a cache-first route writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheTarget {
    Shell,
    Media,
}

/// How a request is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    CacheFirst(CacheTarget),
    NetworkFirst,
    Passthrough,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::CacheFirst(CacheTarget::Shell) => write!(f, "cache_first(shell)"),
            Route::CacheFirst(CacheTarget::Media) => write!(f, "cache_first(media)"),
            Route::NetworkFirst => write!(f, "network_first"),
            Route::Passthrough => write!(f, "passthrough"),
        }
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    SameOrigin(Origin),
    Pattern(Regex),
}

impl Matcher {
    fn matches(&self, url: &Url) -> bool {
        match self {
            Matcher::SameOrigin(origin) => url.origin() == *origin,
            Matcher::Pattern(pattern) => pattern.is_match(url.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    rules: Vec<(Matcher, Route)>,
}

impl Router {
    pub fn new(origin: &Url, trending: Regex, media: Regex) -> Self {
        Self {
            rules: vec![
                (Matcher::SameOrigin(origin.origin()), Route::CacheFirst(CacheTarget::Shell)),
                (Matcher::Pattern(trending), Route::NetworkFirst),
                (Matcher::Pattern(media), Route::CacheFirst(CacheTarget::Media)),
            ],
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::Config(format!("origin: {e}")))?;
        let trending =
            Regex::new(&config.trending_pattern).map_err(|e| Error::Config(format!("trending_pattern: {e}")))?;
        let media = Regex::new(&config.media_pattern).map_err(|e| Error::Config(format!("media_pattern: {e}")))?;
        Ok(Self::new(&origin, trending, media))
    }

    pub fn classify(&self, url: &Url) -> Route {
        self.rules
            .iter()
            .find(|(matcher, _)| matcher.matches(url))
            .map_or(Route::Passthrough, |(_, route)| *route)
    }
}
