//! Cache inspection tools.

pub mod keys;
pub mod list;

pub use keys::{CacheKeysParams, keys_impl};
pub use list::list_impl;
