//! Local caching module.
//!
//! This module provides the `CacheManager` for storing the climb catalog and
//! the derived availability table between runs. Each table is a versioned
//! JSON file, considered fresh while its modification time is younger than
//! the configured limit (10 days for both tables by default).

pub mod manager;

pub use manager::{CacheError, CacheManager, CachedData, AVAILABILITY_CACHE, CLIMBS_CACHE};
