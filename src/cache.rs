use crate::latch::{CountDownGuard, Latch};
use crate::shard::Shard;
use crate::{CacheConfig, CacheObserver, Result, ShardRouter};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;

/// A cache storing values of any type, boxed behind `Arc<dyn Any>`.
///
/// # Examples
/// ```
/// use shardcache::AnyCache;
/// use std::sync::Arc;
///
/// let cache = AnyCache::new(4).unwrap();
/// cache.set("answer", Arc::new(42_u32));
/// cache.set("name", Arc::new("shardcache"));
///
/// let answer = cache.get("answer").unwrap();
/// assert_eq!(answer.downcast_ref::<u32>(), Some(&42));
/// ```
pub type AnyCache = ShardedCache<Arc<dyn Any + Send + Sync>>;

/// A thread-safe key-value cache split into independently locked shards.
///
/// Every key is routed to exactly one shard by a SHA-256 digest of the key,
/// so operations on keys that live in different shards never block each
/// other. No operation holds more than one shard lock at a time.
///
/// Values are opaque to the cache: they are never compared, hashed or
/// serialized. A stored value is always reported as present, even when it is
/// a "zero" value such as `0`, `""` or `None`.
pub struct ShardedCache<V> {
    router: ShardRouter,
    shards: Vec<Arc<Shard<V>>>,
    observer: Option<Arc<dyn CacheObserver>>,
}

impl<V> Default for ShardedCache<V> {
    fn default() -> Self {
        Self::with_router(ShardRouter::default(), 0)
    }
}

impl<V> std::fmt::Debug for ShardedCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedCache")
            .field("shard_count", &self.shard_count())
            .field("len", &self.len())
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl<V> ShardedCache<V> {
    /// Creates a new cache with `shard_count` shards.
    ///
    /// # Arguments
    ///
    /// * `shard_count` - The number of shards to create.
    ///
    /// # Returns
    ///
    /// A new `ShardedCache` instance.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::ZeroShards`](crate::Error::ZeroShards) if
    /// `shard_count` is zero and with
    /// [`Error::TooManyShards`](crate::Error::TooManyShards) if it exceeds
    /// [`MAX_SHARD_COUNT`](crate::MAX_SHARD_COUNT).
    ///
    /// # Examples
    /// ```
    /// use shardcache::{Error, ShardedCache};
    ///
    /// let cache = ShardedCache::<u32>::new(3).unwrap();
    /// assert_eq!(cache.shard_count(), 3);
    /// assert_eq!(ShardedCache::<u32>::new(0).unwrap_err(), Error::ZeroShards);
    /// ```
    pub fn new(shard_count: usize) -> Result<Self> {
        Self::with_capacity_and_shard_count(0, shard_count)
    }

    /// Creates a new cache with the specified initial capacity and number of shards.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The total initial capacity, split evenly across the shards.
    /// * `shard_count` - The number of shards to create.
    ///
    /// # Returns
    ///
    /// A new `ShardedCache` instance, or the error from [`ShardedCache::new`].
    pub fn with_capacity_and_shard_count(capacity: usize, shard_count: usize) -> Result<Self> {
        Ok(Self::with_router(ShardRouter::new(shard_count)?, capacity))
    }

    /// Creates a new cache from a [`CacheConfig`].
    ///
    /// # Arguments
    ///
    /// * `config` - Shard count and initial capacity.
    ///
    /// # Returns
    ///
    /// A new `ShardedCache` instance, or the error from [`ShardedCache::new`].
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::with_capacity_and_shard_count(config.capacity, config.shard_count)
    }

    fn with_router(router: ShardRouter, capacity: usize) -> Self {
        let shard_count = router.shard_count();
        let shard_capacity = capacity / shard_count;
        tracing::debug!(shard_count, capacity, "creating sharded cache");
        Self {
            router,
            shards: (0..shard_count)
                .map(|_| Arc::new(Shard::with_capacity(shard_capacity)))
                .collect(),
            observer: None,
        }
    }

    /// Installs an observer that is notified of every routed key, lookup,
    /// write and delete.
    ///
    /// # Examples
    /// ```
    /// use shardcache::{CountingObserver, ShardedCache};
    /// use std::sync::Arc;
    ///
    /// let observer = Arc::new(CountingObserver::new());
    /// let cache = ShardedCache::new(2).unwrap().with_observer(observer.clone());
    /// cache.set("a", 1);
    /// assert_eq!(cache.get("a"), Some(1));
    /// assert_eq!(cache.get("b"), None);
    ///
    /// let stats = observer.snapshot();
    /// assert_eq!((stats.hits, stats.misses, stats.writes), (1, 1, 1));
    /// ```
    pub fn with_observer(mut self, observer: Arc<dyn CacheObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns the index of the shard that owns `key`.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to route.
    ///
    /// # Returns
    ///
    /// An index in `0..shard_count()`, the same for every call with `key`.
    pub fn shard_index(&self, key: &str) -> usize {
        self.router.route(key)
    }

    /// Gets a clone of the value stored under `key`.
    ///
    /// Takes the owning shard's read lock.
    ///
    /// # Examples
    /// ```
    /// use shardcache::ShardedCache;
    ///
    /// let cache = ShardedCache::new(3).unwrap();
    /// cache.set("a", 0);
    /// assert_eq!(cache.get("a"), Some(0));
    /// assert_eq!(cache.get("z"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let value = self.shard(key).get(key);
        self.observe_lookup(key, value.is_some());
        value
    }

    /// Runs `func` on the value stored under `key` without cloning it.
    ///
    /// `func` runs while the owning shard's read lock is held. It may call
    /// `get`, `get_with`, `contains`, `len` or `keys` on this cache, but a
    /// `set`, `remove`, `delete` or `clear` that reaches the same shard
    /// deadlocks.
    pub fn get_with<F, R>(&self, key: &str, func: F) -> R
    where
        F: FnOnce(Option<&V>) -> R,
    {
        let mut hit = false;
        let ret = self.shard(key).get_with(key, |value| {
            hit = value.is_some();
            func(value)
        });
        self.observe_lookup(key, hit);
        ret
    }

    /// Returns true if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        let hit = self.shard(key).contains(key);
        self.observe_lookup(key, hit);
        hit
    }

    /// Inserts `value` under `key`, overwriting any previous value.
    ///
    /// Takes the owning shard's write lock.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let shard = self.shard(&key);
        if let Some(observer) = &self.observer {
            observer.on_write(&key);
        }
        shard.set(key, value);
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove(&self, key: &str) -> Option<V> {
        let value = self.shard(key).remove(key);
        if let Some(observer) = &self.observer {
            observer.on_delete(key, value.is_some());
        }
        value
    }

    /// Removes `key`. Deleting a key that is not present does nothing.
    pub fn delete(&self, key: &str) {
        self.remove(key);
    }

    /// Counts the entries across all shards, one shard at a time.
    ///
    /// Under concurrent writes the total is not a snapshot of any single
    /// moment.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.is_empty())
    }

    /// Removes every entry, clearing one shard at a time.
    pub fn clear(&self) {
        self.shards.iter().for_each(|s| s.clear());
    }

    /// Lists every key present in the cache, in no particular order.
    ///
    /// One scan thread is spawned per shard; each takes that shard's read lock,
    /// copies its keys and appends them to a shared accumulator guarded by its
    /// own mutex. The call returns only after every scan has finished.
    ///
    /// The result is the union of independent per-shard snapshots, not an
    /// atomic snapshot of the whole cache: a write to one shard may land
    /// between the scans of two others. When nothing is written concurrently,
    /// the result holds every present key exactly once.
    ///
    /// If a scan thread cannot be spawned, that shard is scanned on the calling
    /// thread instead.
    ///
    /// # Panics
    ///
    /// Re-raises a panic from any scan thread after every scan has finished, so
    /// a failed scan never yields a silently incomplete listing.
    ///
    /// # Examples
    /// ```
    /// use shardcache::ShardedCache;
    ///
    /// let cache = ShardedCache::new(3).unwrap();
    /// cache.set("a", 1);
    /// cache.set("b", 2);
    /// cache.set("c", 3);
    ///
    /// let mut keys = cache.keys();
    /// keys.sort();
    /// assert_eq!(keys, ["a", "b", "c"]);
    /// ```
    pub fn keys(&self) -> Vec<String>
    where
        V: Send + Sync + 'static,
    {
        self.scan_shards(|_, shard, keys| shard.collect_keys_into(keys))
    }

    /// Runs `scan` once per shard, each on its own thread, and returns what
    /// the scans appended to the shared accumulator.
    ///
    /// Waits for every scan to finish. A panic in any scan is re-raised on the
    /// calling thread once all scans are done.
    fn scan_shards<F>(&self, scan: F) -> Vec<String>
    where
        V: Send + Sync + 'static,
        F: Fn(usize, &Shard<V>, &Mutex<Vec<String>>) + Clone + Send + 'static,
    {
        if let [shard] = self.shards.as_slice() {
            let keys = Mutex::new(Vec::new());
            scan(0, &**shard, &keys);
            return keys.into_inner();
        }

        let keys = Arc::new(Mutex::new(Vec::new()));
        // The router caps the shard count well below u32::MAX.
        let latch = Arc::new(Latch::new(self.shards.len() as u32));
        let mut handles = Vec::with_capacity(self.shards.len());

        for (index, shard) in self.shards.iter().enumerate() {
            let task = {
                let shard = shard.clone();
                let keys = keys.clone();
                let latch = latch.clone();
                let scan = scan.clone();
                move || {
                    let _guard = CountDownGuard(&*latch);
                    scan(index, &*shard, &*keys);
                }
            };
            let spawned = std::thread::Builder::new()
                .name(format!("shardcache-scan-{index}"))
                .spawn(task);
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    tracing::warn!(index, %err, "failed to spawn shard scan thread, scanning inline");
                    let _guard = CountDownGuard(&*latch);
                    scan(index, &**shard, &*keys);
                }
            }
        }

        latch.wait();
        for handle in handles {
            if let Err(payload) = handle.join() {
                std::panic::resume_unwind(payload);
            }
        }
        let mut keys = keys.lock();
        std::mem::take(&mut *keys)
    }

    #[inline(always)]
    fn shard(&self, key: &str) -> &Shard<V> {
        let index = self.router.route(key);
        if let Some(observer) = &self.observer {
            observer.on_route(key, index);
        }
        &self.shards[index]
    }

    #[inline(always)]
    fn observe_lookup(&self, key: &str, hit: bool) {
        if let Some(observer) = &self.observer {
            observer.on_lookup(key, hit);
        }
    }
}
