//! Cache Module
//!
//! Provides a store-backed cache with TTL expiration and batched LRU eviction.

mod engine;
mod namespace;
mod stats;
mod tracker;


// Re-export public types
pub use engine::LruCache;
pub use namespace::{Identity, KeyNamespacer, PREFIX_DELIMITER};
pub use stats::{StatCounter, StatsRecorder, UsageReport, STAT_EXPIRATION};
pub use tracker::EvictionTracker;
