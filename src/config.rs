use crate::{Result, ShardRouter, MAX_SHARD_COUNT};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Returns the default number of shards: four per available core, rounded up
/// to a power of two and capped at [`MAX_SHARD_COUNT`].
pub fn default_shard_count() -> usize {
    static DEFAULT_SHARD_COUNT: OnceLock<usize> = OnceLock::new();
    *DEFAULT_SHARD_COUNT.get_or_init(|| {
        (std::thread::available_parallelism().map_or(1, usize::from) * 4)
            .next_power_of_two()
            .min(MAX_SHARD_COUNT)
    })
}

/// Construction parameters for a [`ShardedCache`](crate::ShardedCache).
///
/// Missing fields fall back to their defaults when deserialized, so a host
/// service can embed this in its own configuration file.
///
/// # Examples
/// ```
/// use shardcache::{CacheConfig, ShardedCache};
///
/// let config = CacheConfig::default().with_shard_count(3).with_capacity(64);
/// let cache = ShardedCache::<u32>::from_config(&config).unwrap();
/// assert_eq!(cache.shard_count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Number of shards. Fixed for the lifetime of the cache.
    pub shard_count: usize,
    /// Total initial capacity, split evenly across shards.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            shard_count: default_shard_count(),
            capacity: 0,
        }
    }
}

impl CacheConfig {
    pub fn with_shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Checks that the shard count is within `1..=MAX_SHARD_COUNT`.
    pub fn validate(&self) -> Result<()> {
        ShardRouter::new(self.shard_count).map(|_| ())
    }
}
