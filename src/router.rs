use crate::{default_shard_count, Error, Result};
use sha2::{Digest, Sha256};

/// The largest shard count a cache accepts.
pub const MAX_SHARD_COUNT: usize = 1 << 16;

/// Maps `key` to a shard index in `0..shard_count`.
///
/// The key bytes are hashed with SHA-256 and the first eight bytes of the
/// digest, read as a big-endian `u64`, are reduced modulo `shard_count`.
/// Using 64 bits of the digest keeps the distribution uniform for shard
/// counts well beyond 256.
///
/// The result depends only on `key` and `shard_count`.
///
/// # Panics
///
/// Panics if `shard_count` is zero. Callers go through [`ShardRouter`], which
/// validates its count up front and never hits this.
pub(crate) fn shard_index(key: &str, shard_count: usize) -> usize {
    assert!(shard_count > 0, "shard count must be at least 1");
    let digest = Sha256::digest(key.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % shard_count as u64) as usize
}

/// Routes keys to one of a fixed number of shards.
///
/// This is the public entry point for routing: the shard count is checked
/// once in [`ShardRouter::new`], after which [`ShardRouter::route`] cannot fail.
///
/// # Examples
/// ```
/// use shardcache::{Error, ShardRouter};
///
/// let router = ShardRouter::new(8).unwrap();
/// let idx = router.route("user:42");
/// assert!(idx < 8);
/// assert_eq!(router.route("user:42"), idx);
///
/// assert_eq!(ShardRouter::new(0), Err(Error::ZeroShards));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardRouter {
    shard_count: usize,
}

impl Default for ShardRouter {
    fn default() -> Self {
        Self {
            shard_count: default_shard_count(),
        }
    }
}

impl ShardRouter {
    /// Creates a router for `shard_count` shards.
    ///
    /// # Errors
    ///
    /// * [`Error::ZeroShards`] if `shard_count` is zero.
    /// * [`Error::TooManyShards`] if `shard_count` exceeds [`MAX_SHARD_COUNT`].
    pub fn new(shard_count: usize) -> Result<Self> {
        if shard_count == 0 {
            return Err(Error::ZeroShards);
        }
        if shard_count > MAX_SHARD_COUNT {
            return Err(Error::TooManyShards {
                requested: shard_count,
                max: MAX_SHARD_COUNT,
            });
        }
        Ok(Self { shard_count })
    }

    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    #[inline]
    pub fn route(&self, key: &str) -> usize {
        shard_index(key, self.shard_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_router_rejects_invalid_counts() {
        assert_eq!(ShardRouter::new(0), Err(Error::ZeroShards));
        assert_eq!(
            ShardRouter::new(MAX_SHARD_COUNT + 1),
            Err(Error::TooManyShards {
                requested: MAX_SHARD_COUNT + 1,
                max: MAX_SHARD_COUNT,
            })
        );
        assert!(ShardRouter::new(1).is_ok());
        assert!(ShardRouter::new(MAX_SHARD_COUNT).is_ok());
    }

    #[test]
    fn test_single_shard_routes_everything_to_zero() {
        let router = ShardRouter::new(1).unwrap();
        for key in ["", "a", "b", "a much longer key with spaces"] {
            assert_eq!(router.route(key), 0);
        }
    }

    #[test]
    fn test_known_index() {
        // sha256("a") starts with ca978112ca1bbdca.
        let expected = (0xca97_8112_ca1b_bdca_u64 % 3) as usize;
        assert_eq!(shard_index("a", 3), expected);
    }

    #[test]
    fn test_distribution_exceeds_256_buckets() {
        let router = ShardRouter::new(1024).unwrap();
        let used = (0..10_000)
            .map(|i| router.route(&format!("key-{i}")))
            .collect::<HashSet<_>>();
        assert!(used.len() > 256, "only {} buckets used", used.len());
    }

    #[test]
    #[should_panic(expected = "shard count must be at least 1")]
    fn test_shard_index_zero_panics() {
        shard_index("a", 0);
    }

    proptest! {
        #[test]
        fn prop_routing_is_deterministic(key in ".*", n in 1usize..=MAX_SHARD_COUNT) {
            let first = shard_index(&key, n);
            prop_assert!(first < n);
            prop_assert_eq!(shard_index(&key, n), first);
            prop_assert_eq!(ShardRouter::new(n).unwrap().route(&key), first);
        }
    }
}
