//! Cache module for storing catalog responses to disk
//!
//! This module provides a cache manager that persists one raw catalog response
//! per source to the filesystem. Entries older than the configured number of
//! days are ignored (but left on disk) so the next fetch goes to the network.

mod manager;

pub use manager::{describe_age, format_timestamp, is_fresh, CacheError, CacheManager, CachedResponse};
