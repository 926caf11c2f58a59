//! A thread-safe, in-memory key-value cache that splits its keyspace into independently locked shards.
//!
//! # Overview
//! `shardcache` routes every key to one of a fixed number of shards using a SHA-256 digest of
//! the key. Each shard is a `HashMap` behind its own reader/writer lock, so operations on keys
//! in different shards never block each other.
//!
//! # Features
//! - Deterministic key-to-shard routing, uniform for any shard count
//! - Per-shard reader/writer locking, never more than one shard lock held at a time
//! - Explicit presence tracking: storing `0`, `""` or `None` is not the same as absence
//! - Parallel key listing that waits for every shard scan
//! - Optional observer hook for tracing and counters, off the hot path by default
//! - No poisoning, the lock is released normally on panic
//!
//! # Examples
//! ```
//! use shardcache::ShardedCache;
//!
//! let cache = ShardedCache::<u32>::new(3).unwrap();
//!
//! // Basic operations
//! cache.set("a", 1);
//! cache.set("b", 2);
//! assert_eq!(cache.get("a"), Some(1));
//! assert_eq!(cache.get("z"), None);
//!
//! // Listing keys
//! let mut keys = cache.keys();
//! keys.sort();
//! assert_eq!(keys, ["a", "b"]);
//!
//! // Deleting is idempotent
//! cache.delete("a");
//! cache.delete("a");
//! assert!(!cache.contains("a"));
//! ```
#[doc = include_str!("../README.md")]
mod cache;
mod config;
mod error;
mod latch;
mod observer;
mod router;
mod shard;

pub use cache::*;
pub use config::*;
pub use error::*;
pub use observer::*;
pub use router::*;
