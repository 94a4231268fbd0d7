//! Benchmark: Cache hit performance

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vista_stream::{CacheKey, ContentArtifact, ContentCache};

fn cache_hit_perf_benchmark(c: &mut Criterion) {
    let cache = ContentCache::new();
    for x in 0..50 {
        for y in 0..50 {
            let key = CacheKey::new(x, y);
            cache.begin(key).unwrap();
            let artifact = ContentArtifact::from_rgba(key, 4, 4, vec![0; 64]).unwrap();
            cache.complete(key, artifact).unwrap();
        }
    }

    c.bench_function("cache_lookup_hit", |b| {
        b.iter(|| black_box(cache.lookup(black_box(CacheKey::new(25, 25)))))
    });

    c.bench_function("cache_lookup_miss", |b| {
        b.iter(|| black_box(cache.lookup(black_box(CacheKey::new(99, 99)))))
    });

    c.bench_function("cache_in_flight_check", |b| {
        b.iter(|| black_box(cache.is_in_flight(black_box(CacheKey::new(25, 25)))))
    });
}

criterion_group!(benches, cache_hit_perf_benchmark);
criterion_main!(benches);
