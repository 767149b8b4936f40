//! Pipeline Module
//!
//! Scoped batching of store writes into a single submission.

use tracing::warn;

use crate::error::{CacheError, Result};
use crate::store::{StoreClient, StoreOp};

// == Pipeline ==
/// Queues store writes and submits them together.
///
/// Call [`Pipeline::submit`] to flush and observe failures. A pipeline that is
/// dropped with queued operations flushes itself and logs any failure, so
/// queued writes are sent on every exit path.
#[must_use = "queued operations are only sent on submit or drop"]
pub struct Pipeline<'a, S: StoreClient + ?Sized> {
    client: &'a S,
    ops: Vec<StoreOp>,
}

impl<'a, S: StoreClient + ?Sized> Pipeline<'a, S> {
    pub fn new(client: &'a S) -> Self {
        Self {
            client,
            ops: Vec::new(),
        }
    }

    /// Runs `f` against a fresh pipeline and submits it afterwards, whether
    /// `f` succeeded or not. An error from `f` takes precedence over a
    /// submission error.
    pub fn scoped<T, F>(client: &'a S, f: F) -> Result<T>
    where
        F: FnOnce(&mut Pipeline<'a, S>) -> Result<T>,
    {
        let mut pipeline = Self::new(client);
        let outcome = f(&mut pipeline);
        let flushed = pipeline.submit();
        let value = outcome?;
        flushed?;
        Ok(value)
    }

    pub fn set_ex(&mut self, key: &[u8], value: Vec<u8>, ttl_secs: u64) -> &mut Self {
        self.push(StoreOp::SetEx {
            key: key.to_vec(),
            value,
            ttl_secs,
        })
    }

    pub fn delete(&mut self, key: &[u8]) -> &mut Self {
        self.push(StoreOp::Delete { key: key.to_vec() })
    }

    pub fn zadd(&mut self, key: &[u8], member: &[u8], score: f64) -> &mut Self {
        self.push(StoreOp::ZAdd {
            key: key.to_vec(),
            member: member.to_vec(),
            score,
        })
    }

    pub fn zrem(&mut self, key: &[u8], member: &[u8]) -> &mut Self {
        self.push(StoreOp::ZRem {
            key: key.to_vec(),
            member: member.to_vec(),
        })
    }

    pub fn hincrby(&mut self, key: &[u8], field: &str, delta: i64) -> &mut Self {
        self.push(StoreOp::HIncrBy {
            key: key.to_vec(),
            field: field.to_string(),
            delta,
        })
    }

    pub fn expire(&mut self, key: &[u8], ttl_secs: u64) -> &mut Self {
        self.push(StoreOp::Expire {
            key: key.to_vec(),
            ttl_secs,
        })
    }

    pub fn push(&mut self, op: StoreOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    /// Operations queued so far.
    pub fn ops(&self) -> &[StoreOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Flushes the queue in one submission. Failures are not retried.
    pub fn submit(mut self) -> Result<()> {
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        if self.ops.is_empty() {
            return Ok(());
        }
        let ops = std::mem::take(&mut self.ops);
        self.client
            .submit(&ops)
            .map_err(|source| CacheError::Batch {
                ops: ops.len(),
                source,
            })
    }
}

impl<S: StoreClient + ?Sized> Drop for Pipeline<'_, S> {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            warn!("Dropped pipeline failed to flush: {}", err);
        }
    }
}
