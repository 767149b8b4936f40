//! Cache Statistics Module
//!
//! Tracks cache usage counters in a store-side hash with its own expiry.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::store::{Pipeline, StoreClient};

/// Seconds stat counters outlive their last increment (30 days).
pub const STAT_EXPIRATION: u64 = 30 * 86400;

// == Stat Counter ==
/// The counters recorded for every engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatCounter {
    Hit,
    Miss,
    Pop,
    Set,
    Del,
    EncodeError,
    DecodeError,
}

impl StatCounter {
    pub const ALL: [StatCounter; 7] = [
        StatCounter::Hit,
        StatCounter::Miss,
        StatCounter::Pop,
        StatCounter::Set,
        StatCounter::Del,
        StatCounter::EncodeError,
        StatCounter::DecodeError,
    ];

    /// Hash field name used in the store.
    pub fn field(self) -> &'static str {
        match self {
            StatCounter::Hit => "HIT",
            StatCounter::Miss => "MISS",
            StatCounter::Pop => "POP",
            StatCounter::Set => "SET",
            StatCounter::Del => "DEL",
            StatCounter::EncodeError => "DUMPS_ERROR",
            StatCounter::DecodeError => "LOADS_ERROR",
        }
    }
}

impl fmt::Display for StatCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

// == Stats Recorder ==
/// Writes counter increments for one engine.
#[derive(Debug, Clone)]
pub struct StatsRecorder {
    stat_key: Vec<u8>,
}

impl StatsRecorder {
    pub fn new(stat_key: &[u8]) -> Self {
        Self {
            stat_key: stat_key.to_vec(),
        }
    }

    // == Record ==
    /// Queues an increment and refreshes the counters' expiry.
    pub fn record<S: StoreClient + ?Sized>(&self, pipeline: &mut Pipeline<'_, S>, counter: StatCounter, by: i64) {
        pipeline
            .hincrby(&self.stat_key, counter.field(), by)
            .expire(&self.stat_key, STAT_EXPIRATION);
    }

    // == Report ==
    /// Reads the current counters.
    pub fn report<S: StoreClient + ?Sized>(&self, client: &S) -> Result<UsageReport> {
        Ok(UsageReport::from_fields(client.hgetall(&self.stat_key)?))
    }

    // == Clear ==
    /// Deletes all counters.
    pub fn clear<S: StoreClient + ?Sized>(&self, client: &S) -> Result<()> {
        client.delete(&self.stat_key)?;
        Ok(())
    }
}

// == Usage Report ==
/// Snapshot of an engine's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageReport {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of lookups that found nothing usable
    pub misses: u64,
    /// Number of entries evicted to make room
    pub pops: u64,
    /// Number of successful writes
    pub sets: u64,
    /// Number of explicit deletions
    pub deletes: u64,
    /// Values that failed to encode and were not written
    pub encode_errors: u64,
    /// Stored entries that failed to decode and were dropped
    pub decode_errors: u64,
}

impl UsageReport {
    /// Builds a report from raw hash fields; unknown fields are ignored and
    /// missing ones count as zero.
    pub fn from_fields(fields: HashMap<String, i64>) -> Self {
        let count = |counter: StatCounter| {
            fields
                .get(counter.field())
                .map_or(0, |v| u64::try_from(*v).unwrap_or(0))
        };
        Self {
            hits: count(StatCounter::Hit),
            misses: count(StatCounter::Miss),
            pops: count(StatCounter::Pop),
            sets: count(StatCounter::Set),
            deletes: count(StatCounter::Del),
            encode_errors: count(StatCounter::EncodeError),
            decode_errors: count(StatCounter::DecodeError),
        }
    }

    /// Count for a single counter.
    pub fn get(&self, counter: StatCounter) -> u64 {
        match counter {
            StatCounter::Hit => self.hits,
            StatCounter::Miss => self.misses,
            StatCounter::Pop => self.pops,
            StatCounter::Set => self.sets,
            StatCounter::Del => self.deletes,
            StatCounter::EncodeError => self.encode_errors,
            StatCounter::DecodeError => self.decode_errors,
        }
    }

    /// Counter name -> count, in store field names.
    pub fn counts(&self) -> HashMap<&'static str, u64> {
        StatCounter::ALL
            .iter()
            .map(|c| (c.field(), self.get(*c)))
            .collect()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
