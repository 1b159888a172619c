//! Benchmarks for ShardKV engine operations

use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shardkv::{Engine, EngineConfig};

const KEYS: usize = 10_000;

fn populated(shard_count: usize) -> Engine {
    let engine = Engine::new(EngineConfig {
        shard_count,
        ..EngineConfig::default()
    });
    for i in 0..KEYS {
        engine
            .put(format!("key-{}", i), format!("value-{}", i))
            .unwrap();
    }
    engine
}

fn single_thread_benchmarks(c: &mut Criterion) {
    let engine = populated(16);

    c.bench_function("put_overwrite", |b| {
        let mut i = 0usize;
        b.iter(|| {
            let key = format!("key-{}", i % KEYS);
            engine.put(key, black_box(b"new-value")).unwrap();
            i += 1;
        })
    });

    c.bench_function("get_hit", |b| {
        let mut i = 0usize;
        b.iter(|| {
            let key = format!("key-{}", i % KEYS);
            black_box(engine.get(key.as_bytes()));
            i += 1;
        })
    });

    c.bench_function("get_miss", |b| {
        b.iter(|| black_box(engine.get(b"absent-key")))
    });
}

/// Mixed 90% get / 10% put load from several threads, by shard count
fn contended_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_8_threads");

    for shard_count in [1, 16, 64] {
        let engine = Arc::new(populated(shard_count));

        group.bench_with_input(
            BenchmarkId::from_parameter(shard_count),
            &shard_count,
            |b, _| {
                b.iter(|| {
                    let handles: Vec<_> = (0..8)
                        .map(|t| {
                            let engine = Arc::clone(&engine);
                            thread::spawn(move || {
                                for i in 0..1000 {
                                    let key = format!("key-{}", (t * 1000 + i) % KEYS);
                                    if i % 10 == 0 {
                                        engine.put(key, b"v".to_vec()).unwrap();
                                    } else {
                                        black_box(engine.get(key.as_bytes()));
                                    }
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, single_thread_benchmarks, contended_benchmarks);
criterion_main!(benches);
