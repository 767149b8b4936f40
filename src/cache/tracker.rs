//! Eviction Tracker Module
//!
//! Tracks last-access times in a store-side sorted set for LRU eviction.

use crate::error::Result;
use crate::store::{Pipeline, StoreClient};

// == Eviction Tracker ==
/// Sorted set of physical key -> last-access timestamp.
///
/// Members are ranked by score, so:
/// - Rank 0 = Least recently used
/// - Rank -1 = Most recently used
#[derive(Debug, Clone)]
pub struct EvictionTracker {
    /// Sorted-set key holding the records
    access_key: Vec<u8>,
    /// TTL in seconds refreshed whenever the set is written
    expiration: u64,
}

impl EvictionTracker {
    // == Constructor ==
    pub fn new(access_key: &[u8], expiration: u64) -> Self {
        Self {
            access_key: access_key.to_vec(),
            expiration,
        }
    }

    // == Touch ==
    /// Queues an upsert of the key's access time and a tracker TTL refresh.
    pub fn touch<S: StoreClient + ?Sized>(&self, pipeline: &mut Pipeline<'_, S>, key: &[u8], at: f64) {
        pipeline
            .zadd(&self.access_key, key, at)
            .expire(&self.access_key, self.expiration);
    }

    // == Remove ==
    /// Queues removal of a key's record and a tracker TTL refresh.
    pub fn remove<S: StoreClient + ?Sized>(&self, pipeline: &mut Pipeline<'_, S>, key: &[u8]) {
        pipeline
            .zrem(&self.access_key, key)
            .expire(&self.access_key, self.expiration);
    }

    // == Forget ==
    /// Queues removal of a key's record without touching the tracker TTL.
    pub fn forget<S: StoreClient + ?Sized>(&self, pipeline: &mut Pipeline<'_, S>, key: &[u8]) {
        pipeline.zrem(&self.access_key, key);
    }

    // == Oldest ==
    /// Returns the least recently used keys from rank 0 through `stop_rank`
    /// inclusive, oldest first.
    pub fn oldest<S: StoreClient + ?Sized>(&self, client: &S, stop_rank: usize) -> Result<Vec<Vec<u8>>> {
        Ok(client.zrange(&self.access_key, 0, stop_rank as i64)?)
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len<S: StoreClient + ?Sized>(&self, client: &S) -> Result<u64> {
        Ok(client.zcard(&self.access_key)?)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn touch_all(store: &MemoryStore, tracker: &EvictionTracker, keys: &[(&str, f64)]) {
        let mut pipeline = Pipeline::new(store);
        for (key, at) in keys {
            tracker.touch(&mut pipeline, key.as_bytes(), *at);
        }
        pipeline.submit().unwrap();
    }

    #[test]
    fn test_tracker_new() {
        let store = MemoryStore::new();
        let tracker = EvictionTracker::new(b"lru-access:t", 60);
        assert_eq!(tracker.len(&store).unwrap(), 0);
        assert!(tracker.oldest(&store, 0).unwrap().is_empty());
    }

    #[test]
    fn test_touch_new_keys() {
        let store = MemoryStore::new();
        let tracker = EvictionTracker::new(b"lru-access:t", 60);

        touch_all(&store, &tracker, &[("key1", 1.0), ("key2", 2.0), ("key3", 3.0)]);

        assert_eq!(tracker.len(&store).unwrap(), 3);
        // key1 is oldest (added first)
        assert_eq!(tracker.oldest(&store, 0).unwrap(), vec![b"key1".to_vec()]);
    }

    #[test]
    fn test_touch_existing_key_moves_it_back() {
        let store = MemoryStore::new();
        let tracker = EvictionTracker::new(b"lru-access:t", 60);

        touch_all(&store, &tracker, &[("key1", 1.0), ("key2", 2.0), ("key3", 3.0)]);
        touch_all(&store, &tracker, &[("key1", 4.0)]);

        assert_eq!(tracker.len(&store).unwrap(), 3);
        // key2 is now oldest
        assert_eq!(
            tracker.oldest(&store, 2).unwrap(),
            vec![b"key2".to_vec(), b"key3".to_vec(), b"key1".to_vec()]
        );
    }

    #[test]
    fn test_remove_and_forget() {
        let store = MemoryStore::new();
        let tracker = EvictionTracker::new(b"lru-access:t", 60);

        touch_all(&store, &tracker, &[("a", 1.0), ("b", 2.0), ("c", 3.0)]);

        let mut pipeline = Pipeline::new(&store);
        tracker.remove(&mut pipeline, b"b");
        tracker.forget(&mut pipeline, b"nonexistent");
        assert_eq!(pipeline.len(), 3);
        pipeline.submit().unwrap();

        assert_eq!(tracker.len(&store).unwrap(), 2);
        assert_eq!(
            tracker.oldest(&store, 10).unwrap(),
            vec![b"a".to_vec(), b"c".to_vec()]
        );
    }

    #[test]
    fn test_oldest_stop_rank_is_inclusive() {
        let store = MemoryStore::new();
        let tracker = EvictionTracker::new(b"lru-access:t", 60);

        touch_all(&store, &tracker, &[("d", 4.0), ("a", 1.0), ("c", 3.0), ("b", 2.0)]);

        assert_eq!(
            tracker.oldest(&store, 1).unwrap(),
            vec![b"a".to_vec(), b"b".to_vec()]
        );
    }
}
