//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

use redis_lru::store::{StoreOp, StoreResult};
use redis_lru::{MemoryStore, StoreClient, StoreError};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a test-friendly subscriber, filtered by `RUST_LOG`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// == Counting Store ==
/// A [`MemoryStore`] that counts the calls made against it.
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: MemoryStore,
    reads: AtomicUsize,
    writes: AtomicUsize,
    submits: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Single-call writes, not counting those inside a submission.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn submits(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.reads() + self.writes() + self.submits()
    }

    fn read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    fn write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

impl StoreClient for CountingStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.read();
        self.inner.get(key)
    }

    fn set_ex(&self, key: &[u8], value: &[u8], ttl_secs: u64) -> StoreResult<()> {
        self.write();
        self.inner.set_ex(key, value, ttl_secs)
    }

    fn delete(&self, key: &[u8]) -> StoreResult<bool> {
        self.write();
        self.inner.delete(key)
    }

    fn exists(&self, key: &[u8]) -> StoreResult<bool> {
        self.read();
        self.inner.exists(key)
    }

    fn zadd(&self, key: &[u8], member: &[u8], score: f64) -> StoreResult<()> {
        self.write();
        self.inner.zadd(key, member, score)
    }

    fn zrange(&self, key: &[u8], start: i64, stop: i64) -> StoreResult<Vec<Vec<u8>>> {
        self.read();
        self.inner.zrange(key, start, stop)
    }

    fn zrem(&self, key: &[u8], member: &[u8]) -> StoreResult<bool> {
        self.write();
        self.inner.zrem(key, member)
    }

    fn zcard(&self, key: &[u8]) -> StoreResult<u64> {
        self.read();
        self.inner.zcard(key)
    }

    fn hincrby(&self, key: &[u8], field: &str, delta: i64) -> StoreResult<i64> {
        self.write();
        self.inner.hincrby(key, field, delta)
    }

    fn hgetall(&self, key: &[u8]) -> StoreResult<HashMap<String, i64>> {
        self.read();
        self.inner.hgetall(key)
    }

    fn expire(&self, key: &[u8], ttl_secs: u64) -> StoreResult<bool> {
        self.write();
        self.inner.expire(key, ttl_secs)
    }

    fn submit(&self, ops: &[StoreOp]) -> StoreResult<()> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        self.inner.submit(ops)
    }
}

// == Failing Store ==
/// A store whose calls fail with a connection error.
///
/// With `reads_ok`, reads are answered by an inner [`MemoryStore`] and only
/// writes and submissions fail.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    reads_ok: bool,
}

impl FailingStore {
    /// Fails every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers reads, fails writes.
    pub fn read_only() -> Self {
        Self {
            inner: MemoryStore::new(),
            reads_ok: true,
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn refused<T>() -> StoreResult<T> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    fn read<T>(&self, f: impl FnOnce(&MemoryStore) -> StoreResult<T>) -> StoreResult<T> {
        if self.reads_ok {
            f(&self.inner)
        } else {
            Self::refused()
        }
    }
}

impl StoreClient for FailingStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.read(|s| s.get(key))
    }

    fn set_ex(&self, _: &[u8], _: &[u8], _: u64) -> StoreResult<()> {
        Self::refused()
    }

    fn delete(&self, _: &[u8]) -> StoreResult<bool> {
        Self::refused()
    }

    fn exists(&self, key: &[u8]) -> StoreResult<bool> {
        self.read(|s| s.exists(key))
    }

    fn zadd(&self, _: &[u8], _: &[u8], _: f64) -> StoreResult<()> {
        Self::refused()
    }

    fn zrange(&self, key: &[u8], start: i64, stop: i64) -> StoreResult<Vec<Vec<u8>>> {
        self.read(|s| s.zrange(key, start, stop))
    }

    fn zrem(&self, _: &[u8], _: &[u8]) -> StoreResult<bool> {
        Self::refused()
    }

    fn zcard(&self, key: &[u8]) -> StoreResult<u64> {
        self.read(|s| s.zcard(key))
    }

    fn hincrby(&self, _: &[u8], _: &str, _: i64) -> StoreResult<i64> {
        Self::refused()
    }

    fn hgetall(&self, key: &[u8]) -> StoreResult<HashMap<String, i64>> {
        self.read(|s| s.hgetall(key))
    }

    fn expire(&self, _: &[u8], _: u64) -> StoreResult<bool> {
        Self::refused()
    }

    fn submit(&self, _: &[StoreOp]) -> StoreResult<()> {
        Self::refused()
    }
}
