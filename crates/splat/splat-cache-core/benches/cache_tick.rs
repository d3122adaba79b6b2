use criterion::{black_box, criterion_group, criterion_main, Criterion};
use splat_cache_core::{CacheConfig, PaintBatch, RendererColorRegistry, SplatCache, Vec2};

fn loaded_cache(capacity: usize) -> (SplatCache, RendererColorRegistry) {
    let cfg = CacheConfig {
        capacity,
        wave_delay: 0.0,
        ..CacheConfig::default()
    }
    .validate()
    .expect("bench config");
    let mut cache = SplatCache::new(cfg);
    let mut registry = RendererColorRegistry::new();
    let mut sink = PaintBatch::new();
    for i in 0..capacity {
        cache.spawn(Vec2::new(i as f32, 0.0), None, &mut registry, &mut sink);
    }
    (cache, registry)
}

fn bench_tick(c: &mut Criterion) {
    c.bench_function("advance_150_splats", |b| {
        let (mut cache, mut registry) = loaded_cache(150);
        b.iter(|| black_box(cache.advance(1.0 / 60.0, &mut registry)));
    });

    c.bench_function("spawn_and_evict_under_pressure", |b| {
        let (mut cache, mut registry) = loaded_cache(150);
        let mut sink = PaintBatch::new();
        b.iter(|| {
            for _ in 0..8 {
                cache.spawn(Vec2::default(), None, &mut registry, &mut sink);
            }
            sink.clear();
            black_box(cache.advance(1.0 / 60.0, &mut registry))
        });
    });
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
