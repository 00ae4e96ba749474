//! Core types and shared functionality for shellcache.
//!
//! This crate provides:
//! - Versioned cache store with SQLite backend
//! - Request and response snapshot types
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod request;

pub use cache::{CacheDb, EntryKey, ResponseSnapshot};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use request::CacheRequest;
