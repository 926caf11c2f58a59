use foldhash::fast::RandomState;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;

/// One independently locked partition of a [`ShardedCache`](crate::ShardedCache).
///
/// This struct wraps a `HashMap` protected by a `RwLock`: any number of
/// readers or a single writer at a time. The lock does not poison, so a
/// panic while it is held releases it normally.
///
/// Readers take the lock with `read_recursive`, so a thread already holding a
/// read guard (e.g. inside [`Shard::get_with`]) can read this shard again
/// without queueing behind a parked writer.
#[derive(Debug)]
pub(crate) struct Shard<V> {
    /// The underlying hashmap protected by a `RwLock`.
    map: RwLock<HashMap<String, V, RandomState>>,
}

impl<V> Shard<V> {
    /// Creates a new `Shard` with the specified initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: RwLock::new(HashMap::with_capacity_and_hasher(
                capacity,
                RandomState::default(),
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.map.read_recursive().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read_recursive().is_empty()
    }

    pub fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        self.map.read_recursive().get(key).cloned()
    }

    /// Runs `func` on the value stored under `key` while the read lock is held.
    ///
    /// `func` may read this shard again. Writing to it from `func` deadlocks.
    pub fn get_with<F, R>(&self, key: &str, func: F) -> R
    where
        F: FnOnce(Option<&V>) -> R,
    {
        func(self.map.read_recursive().get(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.read_recursive().contains_key(key)
    }

    /// Inserts or overwrites the value under `key`, returning the previous one.
    pub fn set(&self, key: String, value: V) -> Option<V> {
        self.map.write().insert(key, value)
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        self.map.write().remove(key)
    }

    pub fn clear(&self) {
        self.map.write().clear();
    }

    /// Appends every key in this shard to `keys`.
    ///
    /// The shard read lock is held for the whole scan; the accumulator lock
    /// is taken once, after the keys have been copied out.
    pub fn collect_keys_into(&self, keys: &Mutex<Vec<String>>) {
        let local = self.map.read_recursive().keys().cloned().collect::<Vec<_>>();
        keys.lock().extend(local);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    };

    #[test]
    fn test_shard() {
        let shard = Shard::<u32>::with_capacity(16);
        assert!(shard.is_empty());
        assert_eq!(shard.len(), 0);
        assert_eq!(shard.get("a"), None);
        assert!(!shard.contains("a"));

        assert_eq!(shard.set("a".to_string(), 1), None);
        assert!(!shard.is_empty());
        assert_eq!(shard.len(), 1);
        assert_eq!(shard.get("a"), Some(1));
        assert!(shard.contains("a"));

        assert_eq!(shard.set("a".to_string(), 2), Some(1));
        assert_eq!(shard.get("a"), Some(2));
        assert_eq!(shard.len(), 1);

        assert_eq!(shard.remove("a"), Some(2));
        assert_eq!(shard.remove("a"), None);
        assert_eq!(shard.get("a"), None);
        assert!(shard.is_empty());
    }

    #[test]
    fn test_shard_zero_values_are_present() {
        let shard = Shard::<String>::with_capacity(0);
        shard.set("empty".to_string(), String::new());
        assert!(shard.contains("empty"));
        assert_eq!(shard.get("empty"), Some(String::new()));

        let shard = Shard::<Option<u32>>::with_capacity(0);
        shard.set("none".to_string(), None);
        assert!(shard.contains("none"));
        assert_eq!(shard.get("none"), Some(None));
        assert_eq!(shard.get("missing"), None);
    }

    #[test]
    fn test_shard_get_with() {
        let shard = Shard::<Vec<u8>>::with_capacity(0);
        shard.set("bytes".to_string(), vec![1, 2, 3]);
        assert_eq!(shard.get_with("bytes", |v| v.map(|v| v.len())), Some(3));
        assert!(shard.get_with("missing", |v| v.is_none()));
    }

    #[test]
    fn test_shard_collect_keys_and_clear() {
        let shard = Shard::<u32>::with_capacity(0);
        for (i, key) in ["x", "y", "z"].into_iter().enumerate() {
            shard.set(key.to_string(), i as u32);
        }
        let keys = Mutex::new(vec!["already".to_string()]);
        shard.collect_keys_into(&keys);
        let mut keys = keys.into_inner();
        keys.sort();
        assert_eq!(keys, ["already", "x", "y", "z"]);

        shard.clear();
        assert!(shard.is_empty());
    }

    #[test]
    fn test_shard_concurrent() {
        let shard = Arc::new(Shard::<u32>::with_capacity(256));
        let current = Arc::new(AtomicU32::default());
        const N: usize = 1 << 12;
        const M: usize = 8;

        shard.set("counter".to_string(), 0);

        let threads = (0..M)
            .map(|_| {
                let shard = shard.clone();
                let current = current.clone();
                std::thread::spawn(move || {
                    for _ in 0..N {
                        let mut map = shard.map.write();
                        let now = current.fetch_add(1, Ordering::AcqRel);
                        assert_eq!(now, 0);
                        *map.get_mut("counter").unwrap() += 1;
                        let now = current.fetch_sub(1, Ordering::AcqRel);
                        assert_eq!(now, 1);
                    }
                })
            })
            .collect::<Vec<_>>();
        threads.into_iter().for_each(|t| t.join().unwrap());

        assert_eq!(shard.get("counter"), Some((N * M) as u32));
    }
}
