//! Cache Engine Module
//!
//! Main cache engine combining store-side entries with LRU tracking, TTL
//! expiration and usage counters.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{EvictionTracker, Identity, KeyNamespacer, StatCounter, StatsRecorder, UsageReport};
use crate::clock::{Clock, SystemClock};
use crate::codec::{Codec, JsonCodec};
use crate::config::LruConfig;
use crate::error::Result;
use crate::store::{Pipeline, StoreClient};
use crate::value::Value;

// == LRU Cache ==
/// Dictionary-like cache with bounded size and per-entry TTL, stored in a
/// [`StoreClient`].
///
/// Every operation takes `&self`; the engine holds no lock of its own.
#[derive(Debug)]
pub struct LruCache<S, C = JsonCodec> {
    /// Backing store
    client: S,
    /// Value serialization
    codec: C,
    /// Source of access timestamps
    clock: Arc<dyn Clock>,
    keys: KeyNamespacer,
    tracker: EvictionTracker,
    stats: StatsRecorder,
    config: LruConfig,
}

impl<S: StoreClient> LruCache<S, JsonCodec> {
    // == Constructor ==
    /// Creates an engine over `client` for the keyspace named by `identity`.
    ///
    /// The identity and config are validated before any store I/O. When
    /// `config.clear_stat` is set, existing counters are deleted.
    pub fn new(client: S, identity: impl AsRef<[u8]>, config: LruConfig) -> Result<Self> {
        Self::with_codec(client, identity, config, JsonCodec)
    }

    /// Creates an engine over a fresh random identity, for callers with no
    /// keyspace name to share.
    pub fn anonymous(client: S, config: LruConfig) -> Result<Self> {
        Self::from_identity(client, Identity::random(), config, JsonCodec)
    }
}

impl<S: StoreClient, C: Codec> LruCache<S, C> {
    /// Creates an engine with a custom value codec.
    pub fn with_codec(client: S, identity: impl AsRef<[u8]>, config: LruConfig, codec: C) -> Result<Self> {
        let identity = Identity::new(identity)?;
        Self::from_identity(client, identity, config, codec)
    }

    /// Creates an engine for an already validated identity.
    pub fn from_identity(client: S, identity: Identity, config: LruConfig, codec: C) -> Result<Self> {
        config.validate()?;

        let keys = KeyNamespacer::new(identity);
        let tracker = EvictionTracker::new(keys.access_key(), config.expiration);
        let stats = StatsRecorder::new(keys.stat_key());
        let cache = Self {
            client,
            codec,
            clock: Arc::new(SystemClock),
            keys,
            tracker,
            stats,
            config,
        };

        if cache.config.clear_stat {
            cache.stats.clear(&cache.client)?;
            info!("Cleared usage counters for {}", cache.keys.identity());
        }
        Ok(cache)
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn identity(&self) -> &Identity {
        self.keys.identity()
    }

    pub fn config(&self) -> &LruConfig {
        &self.config
    }

    pub fn client(&self) -> &S {
        &self.client
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns None for absent and expired keys, and for entries that fail to
    /// decode; the latter are deleted. A hit refreshes the key's access time
    /// and the TTLs of the entry and the tracker.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let physical = self.keys.entry_key(key);

        let Some(raw) = self.client.get(&physical)? else {
            let mut pipeline = Pipeline::new(&self.client);
            self.stats.record(&mut pipeline, StatCounter::Miss, 1);
            pipeline.submit()?;

            debug!(
                "Cache miss: {}",
                self.keys.logical_key(&physical).unwrap_or_default()
            );
            return Ok(None);
        };

        let mut pipeline = Pipeline::new(&self.client);
        match self.codec.decode(&raw) {
            Ok(value) => {
                pipeline.expire(&physical, self.config.expiration);
                self.tracker.touch(&mut pipeline, &physical, self.clock.now_secs());
                self.stats.record(&mut pipeline, StatCounter::Hit, 1);
                pipeline.submit()?;
                Ok(Some(value))
            }
            Err(err) => {
                warn!("Dropping undecodable entry {}: {}", key, err);
                pipeline.delete(&physical);
                self.tracker.forget(&mut pipeline, &physical);
                self.stats.record(&mut pipeline, StatCounter::DecodeError, 1);
                pipeline.submit()?;
                Ok(None)
            }
        }
    }

    /// Retrieves a value, falling back to `default` on a miss.
    pub fn get_or(&self, key: &str, default: Value) -> Result<Value> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    // == Set ==
    /// Stores a value under `key` with the configured TTL.
    ///
    /// A value the codec cannot encode is counted and skipped without error.
    /// When the cache is at capacity the oldest entries are evicted first.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let encoded = match self.codec.encode(&value) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("Skipping unencodable value for {}: {}", key, err);
                let mut pipeline = Pipeline::new(&self.client);
                self.stats.record(&mut pipeline, StatCounter::EncodeError, 1);
                return pipeline.submit();
            }
        };

        self.ensure_room()?;

        let physical = self.keys.entry_key(key);
        let mut pipeline = Pipeline::new(&self.client);
        pipeline.set_ex(&physical, encoded, self.config.expiration);
        self.tracker.touch(&mut pipeline, &physical, self.clock.now_secs());
        self.stats.record(&mut pipeline, StatCounter::Set, 1);
        pipeline.submit()
    }

    // == Delete ==
    /// Removes an entry and its access record. Deleting an absent key is not
    /// an error.
    pub fn delete(&self, key: &str) -> Result<()> {
        let physical = self.keys.entry_key(key);
        let mut pipeline = Pipeline::new(&self.client);
        pipeline.delete(&physical);
        self.tracker.remove(&mut pipeline, &physical);
        self.stats.record(&mut pipeline, StatCounter::Del, 1);
        pipeline.submit()
    }

    // == Contains ==
    /// Returns true while the entry exists and has not expired.
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.client.exists(&self.keys.entry_key(key))?)
    }

    // == Size ==
    /// Returns the number of tracked entries.
    pub fn size(&self) -> Result<u64> {
        self.tracker.len(&self.client)
    }

    // == Usage ==
    /// Returns the accumulated counters.
    pub fn report_usage(&self) -> Result<UsageReport> {
        self.stats.report(&self.client)
    }

    // == Ensure Room ==
    /// Evicts the oldest batch of entries once the tracker is at capacity.
    ///
    /// The batch spans ranks `0..=stop`, where `stop` is the configured clean
    /// size or the overshoot beyond capacity, whichever is larger.
    fn ensure_room(&self) -> Result<()> {
        let size = self.tracker.len(&self.client)?;
        let max_size = self.config.max_size as u64;
        if size < max_size {
            return Ok(());
        }

        let stop = self.config.once_clean_size().max((size - max_size) as usize);
        let victims = self.tracker.oldest(&self.client, stop)?;

        let mut pipeline = Pipeline::new(&self.client);
        for victim in &victims {
            pipeline.delete(victim);
            self.tracker.forget(&mut pipeline, victim);
        }
        self.stats.record(&mut pipeline, StatCounter::Pop, victims.len() as i64);
        pipeline.submit()?;

        debug!(
            "Evicted {} entries from {} (size was {})",
            victims.len(),
            self.keys.identity(),
            size
        );
        Ok(())
    }
}
