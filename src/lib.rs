//! Redis LRU - A store-backed LRU cache and memoizer
//!
//! Provides a dictionary-like cache with TTL expiration and batched oldest-first
//! eviction, whose entries live in a remote key-value store, plus a memoization
//! wrapper that caches function results through it.

pub mod cache;
pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod memoize;
pub mod store;
pub mod value;

pub use cache::{Identity, LruCache, UsageReport};
pub use config::{LruConfig, MAX_EXPIRATION};
pub use error::{CacheError, Result, StoreError};
pub use memoize::{CallArgs, Memoize, Memoized};
pub use store::{MemoryStore, Pipeline, StoreClient};
pub use value::Value;
