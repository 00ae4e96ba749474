//! Request interception and caching strategies for shellcache.
//!
//! This crate provides the network fetcher, the cache-first and
//! network-first strategies, request routing, cache pruning and the
//! install/activate lifecycle, tied together by [`Worker`].

pub mod background;
pub mod fetch;
pub mod lifecycle;
pub mod message;
pub mod prune;
pub mod router;
pub mod store;
pub mod strategy;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support;

pub use fetch::{FetchClient, FetchConfig, Network};
pub use lifecycle::{GcReport, SeedReport, ShellNamespace};
pub use message::ControlMessage;
pub use prune::PruneReport;
pub use router::{CacheTarget, Route, Router};
pub use store::CacheStore;
pub use worker::{Intercepted, Worker};
