//! Benchmarks for the pooled growable collections of the `reuse_pool` package.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use reuse_pool::{PoolRegistry, PooledArray, PooledList};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

const ITEM_COUNT: u32 = 1_000;

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("rp_growable");

    group.bench_function("vec_push_baseline", |b| {
        b.iter(|| {
            let mut list = Vec::new();
            for value in 0..ITEM_COUNT {
                list.push(value);
            }
            black_box(list)
        });
    });

    let registry = PoolRegistry::new();

    group.bench_function("pooled_list_push", |b| {
        b.iter(|| {
            let mut list = PooledList::new(&registry);
            for value in 0..ITEM_COUNT {
                list.push(value);
            }
            black_box(list)
        });
    });

    group.bench_function("pooled_array_from_slice", |b| {
        let source = (0..ITEM_COUNT).collect::<Vec<_>>();

        b.iter(|| black_box(PooledArray::from_slice(&registry, &source)));
    });

    group.bench_function("pooled_list_remove_front", |b| {
        b.iter(|| {
            let mut list = PooledList::with_capacity(&registry, 100);
            for value in 0..100_u32 {
                list.push(value);
            }
            while list.remove_at(0).is_ok() {}
            black_box(list)
        });
    });

    group.finish();
}
