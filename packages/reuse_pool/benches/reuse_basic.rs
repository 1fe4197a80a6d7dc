//! Basic benchmarks for the `reuse_pool` package.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use reuse_pool::{ArrayPool, Lease, ObjectPool, PoolRegistry};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

type TestItem = [u64; 16];

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("rp_object");

    group.bench_function("box_new_baseline", |b| {
        b.iter(|| drop(black_box(Box::<TestItem>::default())));
    });

    let pool = ObjectPool::<TestItem>::new();

    group.bench_function("acquire_release", |b| {
        b.iter(|| {
            let item = pool.acquire();
            pool.release(black_box(item));
        });
    });

    group.bench_function("acquire_release_leased", |b| {
        b.iter(|| {
            let item = pool.acquire_leased(Lease::Ticks(1_000));
            pool.release(black_box(item));
        });
    });

    group.bench_function("acquire_release_hundred", |b| {
        let mut held = Vec::with_capacity(100);

        b.iter(|| {
            for _ in 0..100 {
                held.push(pool.acquire());
            }

            for item in held.drain(..) {
                pool.release(item);
            }
        });
    });

    group.finish();

    let mut array_group = c.benchmark_group("rp_array");

    let array_pool = ArrayPool::<f32>::new(1024);

    array_group.bench_function("vec_baseline", |b| {
        b.iter(|| drop(black_box(vec![0.0_f32; 1024])));
    });

    array_group.bench_function("acquire_release", |b| {
        b.iter(|| {
            let array = array_pool.acquire();
            array_pool.release(black_box(array));
        });
    });

    array_group.finish();

    let mut registry_group = c.benchmark_group("rp_registry");

    let registry = PoolRegistry::new();

    registry_group.bench_function("acquire_release", |b| {
        b.iter(|| {
            let item = registry.acquire::<TestItem>();
            registry.release(black_box(item));
        });
    });

    registry_group.bench_function("acquire_release_array", |b| {
        b.iter(|| {
            let array = registry.acquire_array::<f32>(1024);
            registry.release(black_box(array));
        });
    });

    registry_group.bench_function("sweep", |b| {
        b.iter(|| registry.sweep());
    });

    registry_group.finish();
}
