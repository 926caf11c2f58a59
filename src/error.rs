use thiserror::Error;

/// Errors raised while building a [`ShardedCache`](crate::ShardedCache).
///
/// Keyed operations never fail: a missing key is reported as `None`, and
/// deleting a missing key does nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A cache needs at least one shard to route keys to.
    #[error("shard count must be at least 1")]
    ZeroShards,

    /// The requested shard count exceeds [`MAX_SHARD_COUNT`](crate::MAX_SHARD_COUNT).
    #[error("shard count {requested} exceeds the maximum of {max}")]
    TooManyShards { requested: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
