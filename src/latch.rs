use std::sync::atomic::{AtomicU32, Ordering};

/// A countdown latch that blocks waiters until it reaches zero.
///
/// Used by `ShardedCache::keys` to wait for every per-shard scan. Waiting and
/// waking go through `atomic_wait`, so a blocked waiter sleeps on the counter
/// itself instead of spinning.
pub struct Latch {
    remaining: AtomicU32,
}

impl Latch {
    /// Creates a latch that opens after `count` calls to [`Latch::count_down`].
    pub fn new(count: u32) -> Self {
        Self {
            remaining: AtomicU32::new(count),
        }
    }

    /// Decrements the counter, waking every waiter when it reaches zero.
    pub fn count_down(&self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            atomic_wait::wake_all(&self.remaining);
        }
    }

    /// Blocks the current thread until the counter reaches zero.
    pub fn wait(&self) {
        loop {
            let remaining = self.remaining.load(Ordering::Acquire);
            if remaining == 0 {
                return;
            }
            atomic_wait::wait(&self.remaining, remaining);
        }
    }
}

/// Counts a latch down when dropped, including during unwinding.
pub struct CountDownGuard<'a>(pub &'a Latch);

impl Drop for CountDownGuard<'_> {
    fn drop(&mut self) {
        self.0.count_down();
    }
}
