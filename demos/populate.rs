//! Populates a small cache and logs its contents.
//!
//! Run with `RUST_LOG=trace cargo run --example populate` to see every routing decision.
use shardcache::{ShardedCache, TracingObserver};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cache = ShardedCache::new(3)?.with_observer(Arc::new(TracingObserver));
    cache.set("a", 1);
    cache.set("b", 2);
    cache.set("c", 3);
    for key in cache.keys() {
        tracing::info!(key, "listed");
    }

    for key in ["a", "b", "z"] {
        tracing::info!(key, value = ?cache.get(key), "get");
    }

    cache.delete("a");
    cache.delete("z");

    tracing::info!(value = ?cache.get("a"), exists = cache.contains("a"), "after delete");
    for key in cache.keys() {
        tracing::info!(key, "listed");
    }
    Ok(())
}
