//! Memory Store Module
//!
//! In-process store client holding strings, sorted sets and integer hashes,
//! each key with optional TTL expiration.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;
use crate::store::{StoreClient, StoreResult};

// == Slot ==
#[derive(Debug, Clone)]
enum Data {
    Str(Vec<u8>),
    ZSet(HashMap<Vec<u8>, f64>),
    Hash(HashMap<String, i64>),
}

#[derive(Debug, Clone)]
struct Slot {
    data: Data,
    /// Expiration timestamp (Unix microseconds), None = no expiration
    expires_at: Option<i64>,
}

impl Slot {
    fn new(data: Data) -> Self {
        Self {
            data,
            expires_at: None,
        }
    }

    /// An entry is expired once the current time reaches its expiration time.
    fn is_expired(&self, now: i64) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }
}

// == Memory Store ==
/// A [`StoreClient`] keeping everything in process memory.
///
/// Expired keys are dropped lazily, when next touched.
#[derive(Debug)]
pub struct MemoryStore {
    slots: Mutex<HashMap<Vec<u8>, Slot>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a store whose expiry follows the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            clock,
        }
    }

    // == Length ==
    /// Returns the number of live keys.
    pub fn len(&self) -> usize {
        let now = self.clock.now_micros();
        let mut slots = self.slots.lock();
        slots.retain(|_, slot| !slot.is_expired(now));
        slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Locks the keyspace after dropping `key` if it has expired.
    fn lock_live(&self, key: &[u8]) -> MutexGuard<'_, HashMap<Vec<u8>, Slot>> {
        let now = self.clock.now_micros();
        let mut slots = self.slots.lock();
        if slots.get(key).is_some_and(|slot| slot.is_expired(now)) {
            slots.remove(key);
        }
        slots
    }

    /// Expiration timestamp `ttl_secs` from now, saturating at the far future.
    fn expiry_after(&self, ttl_secs: u64) -> i64 {
        let now = self.clock.now_micros();
        i64::try_from(ttl_secs)
            .ok()
            .and_then(|secs| secs.checked_mul(1_000_000))
            .and_then(|micros| now.checked_add(micros))
            .unwrap_or(i64::MAX)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn wrong_type(key: &[u8]) -> StoreError {
    StoreError::WrongType(String::from_utf8_lossy(key).into_owned())
}

/// Resolves a possibly negative rank against a sequence length.
fn resolve_rank(rank: i64, len: usize) -> i64 {
    if rank < 0 {
        len as i64 + rank
    } else {
        rank
    }
}

impl StoreClient for MemoryStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        match self.lock_live(key).get(key).map(|slot| &slot.data) {
            None => Ok(None),
            Some(Data::Str(value)) => Ok(Some(value.clone())),
            Some(_) => Err(wrong_type(key)),
        }
    }

    fn set_ex(&self, key: &[u8], value: &[u8], ttl_secs: u64) -> StoreResult<()> {
        let slot = Slot {
            data: Data::Str(value.to_vec()),
            expires_at: Some(self.expiry_after(ttl_secs)),
        };
        self.slots.lock().insert(key.to_vec(), slot);
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.lock_live(key).remove(key).is_some())
    }

    fn exists(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.lock_live(key).contains_key(key))
    }

    fn zadd(&self, key: &[u8], member: &[u8], score: f64) -> StoreResult<()> {
        let mut slots = self.lock_live(key);
        let slot = slots
            .entry(key.to_vec())
            .or_insert_with(|| Slot::new(Data::ZSet(HashMap::new())));
        match &mut slot.data {
            Data::ZSet(members) => {
                members.insert(member.to_vec(), score);
                Ok(())
            }
            _ => Err(wrong_type(key)),
        }
    }

    fn zrange(&self, key: &[u8], start: i64, stop: i64) -> StoreResult<Vec<Vec<u8>>> {
        let slots = self.lock_live(key);
        let members = match slots.get(key).map(|slot| &slot.data) {
            None => return Ok(Vec::new()),
            Some(Data::ZSet(members)) => members,
            Some(_) => return Err(wrong_type(key)),
        };

        let mut ranked: Vec<(&Vec<u8>, f64)> = members.iter().map(|(m, s)| (m, *s)).collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));

        let len = ranked.len();
        let start = resolve_rank(start, len).max(0);
        let stop = resolve_rank(stop, len).min(len as i64 - 1);
        if start > stop {
            return Ok(Vec::new());
        }
        Ok(ranked[start as usize..=stop as usize]
            .iter()
            .map(|(m, _)| (*m).clone())
            .collect())
    }

    fn zrem(&self, key: &[u8], member: &[u8]) -> StoreResult<bool> {
        let mut slots = self.lock_live(key);
        let Some(slot) = slots.get_mut(key) else {
            return Ok(false);
        };
        let Data::ZSet(members) = &mut slot.data else {
            return Err(wrong_type(key));
        };
        let removed = members.remove(member).is_some();
        // An empty sorted set ceases to exist
        if members.is_empty() {
            slots.remove(key);
        }
        Ok(removed)
    }

    fn zcard(&self, key: &[u8]) -> StoreResult<u64> {
        match self.lock_live(key).get(key).map(|slot| &slot.data) {
            None => Ok(0),
            Some(Data::ZSet(members)) => Ok(members.len() as u64),
            Some(_) => Err(wrong_type(key)),
        }
    }

    fn hincrby(&self, key: &[u8], field: &str, delta: i64) -> StoreResult<i64> {
        let mut slots = self.lock_live(key);
        let slot = slots
            .entry(key.to_vec())
            .or_insert_with(|| Slot::new(Data::Hash(HashMap::new())));
        match &mut slot.data {
            Data::Hash(fields) => {
                let count = fields.entry(field.to_string()).or_insert(0);
                *count += delta;
                Ok(*count)
            }
            _ => Err(wrong_type(key)),
        }
    }

    fn hgetall(&self, key: &[u8]) -> StoreResult<HashMap<String, i64>> {
        match self.lock_live(key).get(key).map(|slot| &slot.data) {
            None => Ok(HashMap::new()),
            Some(Data::Hash(fields)) => Ok(fields.clone()),
            Some(_) => Err(wrong_type(key)),
        }
    }

    fn expire(&self, key: &[u8], ttl_secs: u64) -> StoreResult<bool> {
        let expires_at = self.expiry_after(ttl_secs);
        match self.lock_live(key).get_mut(key) {
            Some(slot) => {
                slot.expires_at = Some(expires_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
