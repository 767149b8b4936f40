//! Store Module
//!
//! The backing-store capability the cache engine is written against, a
//! scoped pipeline for batching writes, and an in-process implementation.

mod memory;
mod pipeline;

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::StoreError;

pub use memory::MemoryStore;
pub use pipeline::Pipeline;

/// Result type returned by store clients.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Store Operation ==
/// A write queued for batched submission.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    SetEx {
        key: Vec<u8>,
        value: Vec<u8>,
        ttl_secs: u64,
    },
    Delete {
        key: Vec<u8>,
    },
    ZAdd {
        key: Vec<u8>,
        member: Vec<u8>,
        score: f64,
    },
    ZRem {
        key: Vec<u8>,
        member: Vec<u8>,
    },
    HIncrBy {
        key: Vec<u8>,
        field: String,
        delta: i64,
    },
    Expire {
        key: Vec<u8>,
        ttl_secs: u64,
    },
}

impl StoreOp {
    /// Applies this operation through the client's single-call methods.
    pub fn apply<S: StoreClient + ?Sized>(&self, client: &S) -> StoreResult<()> {
        match self {
            StoreOp::SetEx {
                key,
                value,
                ttl_secs,
            } => client.set_ex(key, value, *ttl_secs),
            StoreOp::Delete { key } => client.delete(key).map(drop),
            StoreOp::ZAdd { key, member, score } => client.zadd(key, member, *score),
            StoreOp::ZRem { key, member } => client.zrem(key, member).map(drop),
            StoreOp::HIncrBy { key, field, delta } => client.hincrby(key, field, *delta).map(drop),
            StoreOp::Expire { key, ttl_secs } => client.expire(key, *ttl_secs).map(drop),
        }
    }
}

// == Store Client ==
/// Blocking client for a key-value store with sorted sets and hashes.
///
/// Semantics follow the usual remote-store conventions: every key holds one
/// kind of value, expiry is per key, sorted-set ranges are inclusive and
/// ordered by `(score, member)`, and negative ranks count from the end.
pub trait StoreClient: Send + Sync {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    fn set_ex(&self, key: &[u8], value: &[u8], ttl_secs: u64) -> StoreResult<()>;

    /// Removes a key of any kind. Returns whether it existed.
    fn delete(&self, key: &[u8]) -> StoreResult<bool>;

    /// Whether the key is present and unexpired.
    fn exists(&self, key: &[u8]) -> StoreResult<bool>;

    /// Adds or updates a sorted-set member.
    fn zadd(&self, key: &[u8], member: &[u8], score: f64) -> StoreResult<()>;

    fn zrange(&self, key: &[u8], start: i64, stop: i64) -> StoreResult<Vec<Vec<u8>>>;

    fn zrem(&self, key: &[u8], member: &[u8]) -> StoreResult<bool>;

    fn zcard(&self, key: &[u8]) -> StoreResult<u64>;

    /// Increments a hash field, returning the new value.
    fn hincrby(&self, key: &[u8], field: &str, delta: i64) -> StoreResult<i64>;

    fn hgetall(&self, key: &[u8]) -> StoreResult<HashMap<String, i64>>;

    /// Sets a key's TTL. Returns false when the key does not exist.
    fn expire(&self, key: &[u8], ttl_secs: u64) -> StoreResult<bool>;

    /// Submits queued operations in one round trip where the client supports
    /// it. The default applies them one at a time, stopping at the first
    /// failure. Submission is not transactional either way.
    fn submit(&self, ops: &[StoreOp]) -> StoreResult<()> {
        ops.iter().try_for_each(|op| op.apply(self))
    }
}

macro_rules! forward_store_client {
    ($($ty:ty),*) => {$(
        impl<T: StoreClient + ?Sized> StoreClient for $ty {
            fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
                (**self).get(key)
            }

            fn set_ex(&self, key: &[u8], value: &[u8], ttl_secs: u64) -> StoreResult<()> {
                (**self).set_ex(key, value, ttl_secs)
            }

            fn delete(&self, key: &[u8]) -> StoreResult<bool> {
                (**self).delete(key)
            }

            fn exists(&self, key: &[u8]) -> StoreResult<bool> {
                (**self).exists(key)
            }

            fn zadd(&self, key: &[u8], member: &[u8], score: f64) -> StoreResult<()> {
                (**self).zadd(key, member, score)
            }

            fn zrange(&self, key: &[u8], start: i64, stop: i64) -> StoreResult<Vec<Vec<u8>>> {
                (**self).zrange(key, start, stop)
            }

            fn zrem(&self, key: &[u8], member: &[u8]) -> StoreResult<bool> {
                (**self).zrem(key, member)
            }

            fn zcard(&self, key: &[u8]) -> StoreResult<u64> {
                (**self).zcard(key)
            }

            fn hincrby(&self, key: &[u8], field: &str, delta: i64) -> StoreResult<i64> {
                (**self).hincrby(key, field, delta)
            }

            fn hgetall(&self, key: &[u8]) -> StoreResult<HashMap<String, i64>> {
                (**self).hgetall(key)
            }

            fn expire(&self, key: &[u8], ttl_secs: u64) -> StoreResult<bool> {
                (**self).expire(key, ttl_secs)
            }

            fn submit(&self, ops: &[StoreOp]) -> StoreResult<()> {
                (**self).submit(ops)
            }
        }
    )*};
}

forward_store_client!(Arc<T>, &T);
