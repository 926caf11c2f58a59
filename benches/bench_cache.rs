use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use shardcache::*;
use std::sync::Arc;

fn criterion_benchmark(c: &mut Criterion) {
    let count = 1 << 16;
    let keys = (0..count).map(|i| format!("key-{i}")).collect::<Vec<_>>();

    c.bench_with_input(
        BenchmarkId::new("insert_into_cache", count),
        &keys,
        |b, keys| {
            b.iter(|| {
                let cache = ShardedCache::with_capacity_and_shard_count(1 << 15, 256).unwrap();
                for (i, key) in keys.iter().enumerate() {
                    cache.set(key.as_str(), i);
                }
            })
        },
    );

    let cache = ShardedCache::with_capacity_and_shard_count(count, 256).unwrap();
    for (i, key) in keys.iter().enumerate() {
        cache.set(key.as_str(), i);
    }
    c.bench_with_input(BenchmarkId::new("get_from_cache", count), &keys, |b, keys| {
        b.iter(|| keys.iter().filter(|key| cache.get(key).is_some()).count())
    });

    let observed = ShardedCache::new(256)
        .unwrap()
        .with_observer(Arc::new(CountingObserver::new()));
    for (i, key) in keys.iter().enumerate() {
        observed.set(key.as_str(), i);
    }
    c.bench_with_input(
        BenchmarkId::new("get_from_observed_cache", count),
        &keys,
        |b, keys| b.iter(|| keys.iter().filter(|key| observed.get(key).is_some()).count()),
    );

    for shard_count in [16, 256] {
        let cache = ShardedCache::with_capacity_and_shard_count(count, shard_count).unwrap();
        for (i, key) in keys.iter().enumerate() {
            cache.set(key.as_str(), i);
        }
        c.bench_with_input(
            BenchmarkId::new("keys", shard_count),
            &cache,
            |b, cache| b.iter(|| cache.keys().len()),
        );
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
