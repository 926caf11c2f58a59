use std::sync::atomic::{AtomicU64, Ordering};

/// Hook for observing cache traffic.
///
/// Every method has an empty default body, so implementors override only what
/// they need. Callbacks run on the calling thread, outside any shard lock, and
/// must be cheap: they sit on the keyed-operation path.
pub trait CacheObserver: Send + Sync {
    /// A key was routed to shard `index`.
    fn on_route(&self, _key: &str, _index: usize) {}

    /// A `get`, `get_with` or `contains` completed.
    fn on_lookup(&self, _key: &str, _hit: bool) {}

    /// A `set` is storing a value under `key`.
    fn on_write(&self, _key: &str) {}

    /// A `remove` or `delete` completed. `existed` is false for a no-op delete.
    fn on_delete(&self, _key: &str, _existed: bool) {}
}

/// Emits a `tracing` event at TRACE level for every routed key, lookup, write
/// and delete.
///
/// Install it to get the per-operation diagnostic log lines; leave it out on
/// throughput-sensitive paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CacheObserver for TracingObserver {
    fn on_route(&self, key: &str, index: usize) {
        tracing::trace!(key, index, "routed key to shard");
    }

    fn on_lookup(&self, key: &str, hit: bool) {
        tracing::trace!(key, hit, "lookup");
    }

    fn on_write(&self, key: &str) {
        tracing::trace!(key, "write");
    }

    fn on_delete(&self, key: &str, existed: bool) {
        tracing::trace!(key, existed, "delete");
    }
}

/// Point-in-time copy of a [`CountingObserver`]'s counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ObserverStats {
    pub routes: u64,
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub deletes: u64,
}

/// Counts cache traffic with relaxed atomics.
#[derive(Debug, Default)]
pub struct CountingObserver {
    routes: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    deletes: AtomicU64,
}

impl CountingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads all counters. Counters are read one by one, so a snapshot taken
    /// under concurrent traffic may mix values from slightly different moments.
    pub fn snapshot(&self) -> ObserverStats {
        ObserverStats {
            routes: self.routes.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
        }
    }
}

impl CacheObserver for CountingObserver {
    fn on_route(&self, _key: &str, _index: usize) {
        self.routes.fetch_add(1, Ordering::Relaxed);
    }

    fn on_lookup(&self, _key: &str, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn on_write(&self, _key: &str) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    fn on_delete(&self, _key: &str, existed: bool) {
        if existed {
            self.deletes.fetch_add(1, Ordering::Relaxed);
        }
    }
}
