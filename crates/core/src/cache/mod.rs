//! SQLite-backed versioned cache store.
//!
//! Named caches ("generations") hold request → response snapshots keyed by a
//! SHA-256 cache key. It supports:
//!
//! - Versioned generation names (`static-1.0`) and bare on-demand names (`giphy`)
//! - Lookup scoped to one cache or across all caches in creation order
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod generations;
pub mod hash;
pub mod migrations;
pub mod snapshots;

pub use crate::Error;

pub use connection::CacheDb;
pub use generations::CacheSummary;
pub use snapshots::{EntryKey, ResponseSnapshot};
